//! # Scene Engine
//!
//! Runtime core of a retained-mode scene graph.
//!
//! ## Features
//!
//! - **Camera groups**: drawables and cameras opt into any of 64 independent groups
//! - **Z-ordered indices**: per-group draw order without per-frame sorting
//! - **Transform propagation**: dirty-flagged 2D and 3D transforms composed down the tree
//! - **Frame dispatch**: culling-aware camera passes with post-effect flush boundaries
//! - **Headless graphics**: a recording graphics layer for tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     logging::init(&config.logging);
//!
//!     let mut engine = Engine::new(config)?;
//!     let mut graphics = HeadlessGraphics::new(TextureSize::new(800, 600));
//!     let mut culling = PassThroughCulling::new();
//!
//!     let sprite = engine.add_node(Node::sprite(None, Vec2::new(32.0, 32.0)).with_z_order(10))?;
//!     engine.transform_2d_mut(sprite)?.set_position(Vec2::new(100.0, 100.0));
//!
//!     while engine.update(&mut graphics, &mut culling) {
//!         # break;
//!     }
//!     engine.terminate(&mut graphics)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

mod engine;

pub use engine::{Engine, EngineError, FrameError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{Config, EngineConfig},
        foundation::{
            logging,
            collections::NodeId,
            math::{Mat4, Quat, Vec2, Vec3},
        },
        render::{
            Color, CullingSystem, FrameStats, GraphicsLayer, HeadlessGraphics, MaterialId, PassThroughCulling,
            RenderTexture, TextureId, TextureSize,
        },
        scene::{
            Camera, Dimension, FullscreenPostEffect, Node, PostEffect, SceneError, Transform2D, Transform3D,
        },
        Engine, EngineError, FrameError,
    };
}
