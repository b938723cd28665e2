//! Graphics layer abstraction
//!
//! The scene core never talks to a GPU API directly. Everything it needs from
//! the renderer goes through [`GraphicsLayer`]: frame begin/end, camera
//! binding, draw submission, batch flushing and the texture operations used by
//! post-effects.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::collections::NodeId;
use crate::foundation::math::Mat4;
use crate::scene::{Dimension, DrawnContent};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Create a color from components
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(50, 50, 50, 255)
    }
}

/// Opaque handle to a texture owned by the graphics layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Opaque handle to a material owned by the graphics layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u64);

/// Texture dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl TextureSize {
    /// Create a size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height; 1.0 for empty sizes
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Pixel format of a render texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, the swapchain format
    #[default]
    Rgba8,
    /// 16-bit float RGBA
    Rgba16Float,
    /// 32-bit float RGBA
    Rgba32Float,
}

/// A texture that can be rendered into or copied from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTexture {
    /// Graphics-layer handle
    pub id: TextureId,
    /// Size in pixels
    pub size: TextureSize,
    /// Pixel format
    pub format: TextureFormat,
}

bitflags! {
    /// Which attachments a render pass clears
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u8 {
        /// Clear the color attachment with the pass color
        const COLOR = 0b01;
        /// Clear the depth attachment
        const DEPTH = 0b10;
    }
}

/// Clear color and clear behavior of a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderPassParameter {
    /// Color used when [`ClearFlags::COLOR`] is set
    pub clear_color: Color,
    /// Attachments to clear
    pub clear: ClearFlags,
}

impl RenderPassParameter {
    /// Create a pass parameter
    pub const fn new(clear_color: Color, clear: ClearFlags) -> Self {
        Self { clear_color, clear }
    }
}

/// Camera state as seen by the graphics layer for one pass
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCamera {
    /// 2D or 3D pass
    pub dimension: Dimension,
    /// Combined view (and, for 3D, projection) matrix
    pub view: Mat4,
    /// Render target; `None` renders to the screen
    pub target_texture: Option<RenderTexture>,
    /// Clear behavior at the start of the pass
    pub render_pass: RenderPassParameter,
}

impl RenderedCamera {
    /// A camera with an identity view rendering to the screen
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            view: Mat4::identity(),
            target_texture: None,
            render_pass: RenderPassParameter::default(),
        }
    }
}

/// One draw submission
#[derive(Debug)]
pub struct DrawRequest<'a> {
    /// Node being drawn
    pub node: NodeId,
    /// Which renderer (2D or 3D) the draw belongs to
    pub dimension: Dimension,
    /// Draw-order key, for backends that re-sort inside a batch
    pub z_order: i32,
    /// Absolute transform of the node (identity for nodes without one)
    pub transform: &'a Mat4,
    /// What to draw
    pub content: &'a DrawnContent,
}

/// Contract with the GPU abstraction layer.
///
/// Submissions accumulate into a batch until [`flush_batch`](Self::flush_batch)
/// resolves them into the current render target.
pub trait GraphicsLayer {
    /// Start a frame. Returning `false` abandons the frame.
    fn begin_frame(&mut self, params: &RenderPassParameter) -> bool;

    /// Finish and present the frame. Returning `false` reports a lost frame.
    fn end_frame(&mut self) -> bool;

    /// The screen back-buffer as a copyable texture
    fn screen_texture(&self) -> RenderTexture;

    /// Bind the camera used by subsequent submissions
    fn set_camera(&mut self, camera: &RenderedCamera);

    /// Append a draw to the current batch
    fn submit(&mut self, request: &DrawRequest<'_>);

    /// Render the accumulated batch into the current target
    fn flush_batch(&mut self);

    /// Copy texels from `src` into `dst`
    fn copy_texture(&mut self, src: &RenderTexture, dst: &RenderTexture);

    /// Create a scratch render texture
    fn acquire_scratch_texture(&mut self, size: TextureSize, format: TextureFormat) -> RenderTexture;

    /// Destroy a scratch render texture created by `acquire_scratch_texture`
    fn release_scratch_texture(&mut self, texture: &RenderTexture);

    /// Render a fullscreen pass with `material`, sampling `source`
    fn draw_fullscreen(&mut self, material: MaterialId, source: &RenderTexture);

    /// Debug overlay for a transform node
    fn draw_transform_info(&mut self, _node: NodeId, _transform: &Mat4) {}
}
