//! # Rendering System
//!
//! Bridge between the scene core and whatever renders it.
//!
//! ## Architecture
//!
//! - **GraphicsLayer**: contract with the GPU abstraction, consumed by the dispatcher
//! - **CullingSystem**: contract with frustum culling, consulted once per camera pass
//! - **FrameDispatcher**: per-frame camera passes over the scene indices
//! - **RenderTextureCache**: pooled scratch textures sampled by post-effects
//! - **HeadlessGraphics**: recording graphics layer for tests and windowless hosts

mod culling;
mod dispatcher;
mod graphics;
mod headless;
mod render_texture_cache;

pub use culling::{CullingId, CullingIdAllocator, CullingSystem, PassThroughCulling};
pub use dispatcher::{FrameDispatcher, FrameStats, PassContext};
pub use graphics::{
    ClearFlags, Color, DrawRequest, GraphicsLayer, MaterialId, RenderPassParameter, RenderTexture, RenderedCamera,
    TextureFormat, TextureId, TextureSize,
};
pub use headless::{GraphicsCall, HeadlessGraphics, HEADLESS_SCREEN_TEXTURE};
pub use render_texture_cache::RenderTextureCache;
