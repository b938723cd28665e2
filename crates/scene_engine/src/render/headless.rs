//! Headless graphics layer
//!
//! Records every call the scene core makes instead of talking to a GPU.
//! Used by the test-suite and by hosts that want to run the frame loop
//! without a window (tools, servers, CI).

use crate::foundation::collections::NodeId;
use crate::foundation::math::Mat4;

use super::{
    DrawRequest, GraphicsLayer, MaterialId, RenderPassParameter, RenderTexture, RenderedCamera, TextureFormat,
    TextureId, TextureSize,
};
use crate::scene::Dimension;

/// One recorded graphics-layer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsCall {
    /// `begin_frame`
    BeginFrame(RenderPassParameter),
    /// `end_frame`
    EndFrame,
    /// `set_camera`
    SetCamera {
        /// Pass dimension
        dimension: Dimension,
        /// Render target, `None` for the screen
        target: Option<TextureId>,
    },
    /// `submit`
    Submit {
        /// Submitted node
        node: NodeId,
        /// Its z-order at submission time
        z_order: i32,
    },
    /// `flush_batch`
    FlushBatch,
    /// `copy_texture`
    CopyTexture {
        /// Source texture
        src: TextureId,
        /// Destination texture
        dst: TextureId,
    },
    /// `acquire_scratch_texture`
    AcquireScratch(TextureId),
    /// `release_scratch_texture`
    ReleaseScratch(TextureId),
    /// `draw_fullscreen`
    DrawFullscreen {
        /// Material used
        material: MaterialId,
        /// Sampled texture
        source: TextureId,
    },
    /// `draw_transform_info`
    TransformInfo(NodeId),
}

/// Screen texture handle used by [`HeadlessGraphics`]
pub const HEADLESS_SCREEN_TEXTURE: TextureId = TextureId(0);

/// Graphics layer that records calls instead of rendering
#[derive(Debug)]
pub struct HeadlessGraphics {
    screen_size: TextureSize,
    calls: Vec<GraphicsCall>,
    next_texture: u64,
    fail_begin_frame: bool,
    fail_end_frame: bool,
    frame_open: bool,
}

impl HeadlessGraphics {
    /// Create a headless layer with a screen of the given size
    pub fn new(screen_size: TextureSize) -> Self {
        Self {
            screen_size,
            calls: Vec::new(),
            next_texture: HEADLESS_SCREEN_TEXTURE.0 + 1,
            fail_begin_frame: false,
            fail_end_frame: false,
            frame_open: false,
        }
    }

    /// Every call recorded so far
    pub fn calls(&self) -> &[GraphicsCall] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<GraphicsCall> {
        std::mem::take(&mut self.calls)
    }

    /// Nodes submitted so far, in submission order
    pub fn submitted_nodes(&self) -> Vec<NodeId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GraphicsCall::Submit { node, .. } => Some(*node),
                _ => None,
            })
            .collect()
    }

    /// Resize the simulated screen
    pub fn set_screen_size(&mut self, size: TextureSize) {
        self.screen_size = size;
    }

    /// Make the next `begin_frame` calls fail (simulated device loss)
    pub fn set_fail_begin_frame(&mut self, fail: bool) {
        self.fail_begin_frame = fail;
    }

    /// Make the next `end_frame` calls fail
    pub fn set_fail_end_frame(&mut self, fail: bool) {
        self.fail_end_frame = fail;
    }

    /// True between a successful `begin_frame` and the matching `end_frame`
    pub fn is_frame_open(&self) -> bool {
        self.frame_open
    }
}

impl GraphicsLayer for HeadlessGraphics {
    fn begin_frame(&mut self, params: &RenderPassParameter) -> bool {
        if self.fail_begin_frame {
            log::warn!("headless graphics: begin_frame refused");
            return false;
        }
        self.calls.push(GraphicsCall::BeginFrame(*params));
        self.frame_open = true;
        true
    }

    fn end_frame(&mut self) -> bool {
        self.frame_open = false;
        if self.fail_end_frame {
            log::warn!("headless graphics: end_frame refused");
            return false;
        }
        self.calls.push(GraphicsCall::EndFrame);
        true
    }

    fn screen_texture(&self) -> RenderTexture {
        RenderTexture {
            id: HEADLESS_SCREEN_TEXTURE,
            size: self.screen_size,
            format: TextureFormat::Rgba8,
        }
    }

    fn set_camera(&mut self, camera: &RenderedCamera) {
        self.calls.push(GraphicsCall::SetCamera {
            dimension: camera.dimension,
            target: camera.target_texture.map(|texture| texture.id),
        });
    }

    fn submit(&mut self, request: &DrawRequest<'_>) {
        self.calls.push(GraphicsCall::Submit {
            node: request.node,
            z_order: request.z_order,
        });
    }

    fn flush_batch(&mut self) {
        self.calls.push(GraphicsCall::FlushBatch);
    }

    fn copy_texture(&mut self, src: &RenderTexture, dst: &RenderTexture) {
        self.calls.push(GraphicsCall::CopyTexture { src: src.id, dst: dst.id });
    }

    fn acquire_scratch_texture(&mut self, size: TextureSize, format: TextureFormat) -> RenderTexture {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.calls.push(GraphicsCall::AcquireScratch(id));
        RenderTexture { id, size, format }
    }

    fn release_scratch_texture(&mut self, texture: &RenderTexture) {
        self.calls.push(GraphicsCall::ReleaseScratch(texture.id));
    }

    fn draw_fullscreen(&mut self, material: MaterialId, source: &RenderTexture) {
        self.calls.push(GraphicsCall::DrawFullscreen { material, source: source.id });
    }

    fn draw_transform_info(&mut self, node: NodeId, _transform: &Mat4) {
        self.calls.push(GraphicsCall::TransformInfo(node));
    }
}
