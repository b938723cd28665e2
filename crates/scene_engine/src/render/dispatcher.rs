//! Per-frame draw dispatch
//!
//! One pass per camera: walk the drawable index of the camera's group in
//! ascending z-order, drop what is hidden or culled, submit the rest, and
//! flush the accumulated batch before every post-effect so the effect samples
//! a framebuffer holding exactly the draws that precede it.

use crate::foundation::collections::NodeId;
use crate::scene::{Dimension, DrawnKind, SceneError, SceneTree, MAX_CAMERA_GROUP_COUNT};

use super::{
    CullingId, CullingSystem, DrawRequest, GraphicsLayer, RenderTexture, RenderTextureCache, RenderedCamera,
    TextureSize,
};

/// Counters of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Camera passes drawn, default cameras included
    pub passes: u32,
    /// Draws submitted to the graphics layer
    pub submitted: u32,
    /// Cullable drawables rejected by the culling system
    pub culled: u32,
    /// Drawables skipped because they or an ancestor are hidden
    pub hidden: u32,
    /// Degenerate polygons and meshes skipped
    pub degenerate: u32,
    /// Batch flushes
    pub flushes: u32,
    /// Post-effects run
    pub post_effects: u32,
    /// Custom cameras skipped because their target is empty
    pub skipped_cameras: u32,
}

/// Borrowed collaborators of one frame
pub struct PassContext<'a> {
    /// Scene to draw
    pub tree: &'a SceneTree,
    /// Graphics layer receiving the draws
    pub graphics: &'a mut dyn GraphicsLayer,
    /// Source of per-camera visible culling ids
    pub culling: &'a dyn CullingSystem,
    /// Scratch textures for post-effects
    pub textures: &'a mut RenderTextureCache,
}

/// Runs the camera passes of a frame
#[derive(Debug, Default)]
pub struct FrameDispatcher {
    culling_scratch: Vec<CullingId>,
    visible_transform_info: bool,
}

impl FrameDispatcher {
    /// Create a dispatcher
    pub fn new(visible_transform_info: bool) -> Self {
        Self {
            culling_scratch: Vec::new(),
            visible_transform_info,
        }
    }

    /// Whether passes end with the transform-info debug walk
    pub fn visible_transform_info(&self) -> bool {
        self.visible_transform_info
    }

    /// Toggle the transform-info debug walk
    pub fn set_visible_transform_info(&mut self, visible: bool) {
        self.visible_transform_info = visible;
    }

    /// Draw every pass of the frame.
    ///
    /// A dimension without registered cameras is drawn once through its
    /// default camera over the global index. Otherwise its default pass is
    /// skipped and every camera of every group draws that group's index.
    /// Order: default 3D, default 2D, then per group 3D cameras before 2D.
    pub fn draw_frame(
        &mut self,
        ctx: &mut PassContext<'_>,
        default_2d: &RenderedCamera,
        default_3d: &RenderedCamera,
    ) -> Result<FrameStats, SceneError> {
        let mut stats = FrameStats::default();
        let tree = ctx.tree;
        let indices = tree.indices();
        let custom_3d = indices.cameras(Dimension::ThreeD).count() != 0;
        let custom_2d = indices.cameras(Dimension::TwoD).count() != 0;

        if !custom_3d {
            self.draw_pass(ctx, default_3d, None, &mut stats)?;
        }
        if !custom_2d {
            self.draw_pass(ctx, default_2d, None, &mut stats)?;
        }

        let screen = ctx.graphics.screen_texture().size;
        for group in 0..MAX_CAMERA_GROUP_COUNT {
            for dimension in [Dimension::ThreeD, Dimension::TwoD] {
                for &camera in indices.cameras(dimension).cameras(group) {
                    self.draw_custom_camera(ctx, camera, group, screen, &mut stats)?;
                }
            }
        }

        log::trace!("frame dispatched: {stats:?}");
        Ok(stats)
    }

    fn draw_custom_camera(
        &mut self,
        ctx: &mut PassContext<'_>,
        id: NodeId,
        group: usize,
        screen: TextureSize,
        stats: &mut FrameStats,
    ) -> Result<(), SceneError> {
        let tree = ctx.tree;
        let camera = tree
            .get(id)
            .ok_or(SceneError::UnknownNode(id))?
            .camera()
            .ok_or(SceneError::NotCamera(id))?;

        if camera.target_size(screen).is_empty() {
            log::debug!("camera {id:?} skipped: empty render target");
            stats.skipped_cameras += 1;
            return Ok(());
        }
        self.draw_pass(ctx, camera.rendered(), Some(group), stats)
    }

    /// Draw one camera over one index map (`None` for the global map)
    pub fn draw_pass(
        &mut self,
        ctx: &mut PassContext<'_>,
        camera: &RenderedCamera,
        group: Option<usize>,
        stats: &mut FrameStats,
    ) -> Result<(), SceneError> {
        let tree = ctx.tree;
        let dimension = camera.dimension;
        ctx.graphics.set_camera(camera);
        stats.passes += 1;

        self.culling_scratch.clear();
        self.culling_scratch.extend_from_slice(ctx.culling.visible_ids(camera));
        self.culling_scratch.sort_unstable();

        let mut pending = false;
        let mut target: Option<RenderTexture> = None;
        let mut scratch: Option<RenderTexture> = None;

        for (_, bucket) in tree.indices().drawn(dimension).iter(group) {
            for &id in bucket {
                let node = tree.get(id).ok_or(SceneError::UnknownNode(id))?;
                let drawn = node.drawn().ok_or(SceneError::NotDrawn(id))?;

                let content = match drawn.kind() {
                    DrawnKind::PostEffect(effect) => {
                        if pending {
                            ctx.graphics.flush_batch();
                            stats.flushes += 1;
                            pending = false;
                        }

                        let target = *target
                            .get_or_insert_with(|| camera.target_texture.unwrap_or_else(|| ctx.graphics.screen_texture()));
                        let scratch = match scratch {
                            Some(texture) => texture,
                            None => *scratch.insert(ctx.textures.acquire(&mut *ctx.graphics, target.size, target.format)),
                        };

                        ctx.graphics.copy_texture(&target, &scratch);
                        effect.draw(&mut *ctx.graphics, &scratch, camera.render_pass.clear_color);
                        stats.post_effects += 1;
                        continue;
                    }
                    DrawnKind::Cullable { culling_id, content } => {
                        if !drawn.is_drawn_actually() {
                            stats.hidden += 1;
                            continue;
                        }
                        if self.culling_scratch.binary_search(culling_id).is_err() {
                            stats.culled += 1;
                            continue;
                        }
                        content
                    }
                    DrawnKind::Plain { content } => {
                        if !drawn.is_drawn_actually() {
                            stats.hidden += 1;
                            continue;
                        }
                        content
                    }
                };

                if content.is_degenerate() {
                    log::trace!("skipping degenerate drawable {id:?}");
                    stats.degenerate += 1;
                    continue;
                }

                let transform = node.absolute_transform();
                ctx.graphics.submit(&DrawRequest {
                    node: id,
                    dimension,
                    z_order: drawn.z_order(),
                    transform: &transform,
                    content,
                });
                stats.submitted += 1;
                pending = true;
            }
        }

        if self.visible_transform_info {
            for id in tree.indices().drawn(dimension).elements(group) {
                let Some(node) = tree.get(id) else {
                    continue;
                };
                let Some(drawn) = node.drawn() else {
                    continue;
                };
                let Some(culling_id) = drawn.culling_id() else {
                    continue;
                };
                if !drawn.is_drawn_actually() || self.culling_scratch.binary_search(&culling_id).is_err() {
                    continue;
                }
                if let Some(transform) = node.transform() {
                    ctx.graphics.draw_transform_info(id, transform.absolute());
                    pending = true;
                }
            }
        }

        if pending {
            ctx.graphics.flush_batch();
            stats.flushes += 1;
        }
        Ok(())
    }
}
