//! Core engine implementation
//!
//! [`Engine`] owns the scene and everything the frame loop reuses between
//! frames. The graphics layer and the culling system are borrowed per call,
//! so the host keeps ownership of its GPU resources.
//!
//! Not safe for concurrent mutation: one thread drives `update`.

use thiserror::Error;

use crate::core::config::{ConfigError, EngineConfig};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3};
use crate::render::{
    ClearFlags, Color, CullingSystem, FrameDispatcher, FrameStats, GraphicsLayer, PassContext, RenderPassParameter,
    RenderTextureCache, RenderedCamera, TextureSize,
};
use crate::scene::{
    Camera, Dimension, DrawnContent, Node, SceneError, SceneTree, Transform2D, Transform3D,
};

/// Why a frame was not completed
#[derive(Debug, Error)]
pub enum FrameError {
    /// The graphics layer refused to start the frame
    #[error("graphics layer failed to begin the frame")]
    BeginFrame,

    /// The graphics layer failed to finish or present the frame
    #[error("graphics layer failed to end the frame")]
    EndFrame,

    /// Scene invariant broken while preparing or dispatching the frame
    #[error("scene error during frame: {0}")]
    Scene(#[from] SceneError),
}

/// Engine lifecycle errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scene error outside the frame loop
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Scene context: tree, indices, default cameras and per-frame scratch state
#[derive(Debug)]
pub struct Engine {
    tree: SceneTree,
    dispatcher: FrameDispatcher,
    textures: RenderTextureCache,
    default_2d: RenderedCamera,
    default_3d: RenderedCamera,
    screen_size: Option<TextureSize>,
    update_root: Option<NodeId>,
    camera_scratch: Vec<NodeId>,
    config: EngineConfig,
    frame: u64,
}

impl Engine {
    /// Create an engine with an empty scene
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Initializing scene engine...");

        let tree = SceneTree::new();
        let update_root = Some(tree.root());
        let default_pass = RenderPassParameter::new(config.graphics.clear_color, ClearFlags::empty());

        let mut default_2d = RenderedCamera::new(Dimension::TwoD);
        default_2d.render_pass = default_pass;
        let mut default_3d = RenderedCamera::new(Dimension::ThreeD);
        default_3d.render_pass = default_pass;

        Ok(Self {
            tree,
            dispatcher: FrameDispatcher::new(config.debug.visible_transform_info),
            textures: RenderTextureCache::new(),
            default_2d,
            default_3d,
            screen_size: None,
            update_root,
            camera_scratch: Vec::new(),
            config,
            frame: 0,
        })
    }

    /// The scene
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Root of the live tree
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Frames completed since creation
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Move a node into the scene arena, detached
    pub fn insert(&mut self, node: Node) -> NodeId {
        self.tree.insert(node)
    }

    /// Insert a node and queue it under the root
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, SceneError> {
        let id = self.tree.insert(node);
        self.tree.add_child(self.tree.root(), id)?;
        Ok(id)
    }

    /// See [`SceneTree::add_child`]
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.tree.add_child(parent, child)
    }

    /// See [`SceneTree::remove_child`]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.tree.remove_child(parent, child)
    }

    /// Apply queued attaches and detaches now instead of at the next update
    pub fn flush_queue(&mut self) -> Result<(), SceneError> {
        self.tree.flush_queue()
    }

    /// See [`SceneTree::destroy`]
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        if self.update_root == Some(id) {
            self.update_root = None;
        }
        self.tree.destroy(id)
    }

    /// See [`SceneTree::set_z_order`]
    pub fn set_z_order(&mut self, id: NodeId, z_order: i32) -> Result<(), SceneError> {
        self.tree.set_z_order(id, z_order)
    }

    /// See [`SceneTree::set_camera_group`]
    pub fn set_camera_group(&mut self, id: NodeId, camera_group: u64) -> Result<(), SceneError> {
        self.tree.set_camera_group(id, camera_group)
    }

    /// See [`SceneTree::set_is_drawn`]
    pub fn set_is_drawn(&mut self, id: NodeId, is_drawn: bool) -> Result<(), SceneError> {
        self.tree.set_is_drawn(id, is_drawn)
    }

    /// See [`SceneTree::set_camera_group_mask`]
    pub fn set_camera_group_mask(&mut self, id: NodeId, group: u64) -> Result<(), SceneError> {
        self.tree.set_camera_group_mask(id, group)
    }

    /// See [`SceneTree::transform_2d_mut`]
    pub fn transform_2d_mut(&mut self, id: NodeId) -> Result<&mut Transform2D, SceneError> {
        self.tree.transform_2d_mut(id)
    }

    /// See [`SceneTree::transform_3d_mut`]
    pub fn transform_3d_mut(&mut self, id: NodeId) -> Result<&mut Transform3D, SceneError> {
        self.tree.transform_3d_mut(id)
    }

    /// See [`SceneTree::camera_mut`]
    pub fn camera_mut(&mut self, id: NodeId) -> Result<&mut Camera, SceneError> {
        self.tree.camera_mut(id)
    }

    /// See [`SceneTree::content_mut`]
    pub fn content_mut(&mut self, id: NodeId) -> Result<&mut DrawnContent, SceneError> {
        self.tree.content_mut(id)
    }

    /// Screen clear color, also used by both default cameras
    pub fn clear_color(&self) -> Color {
        self.config.graphics.clear_color
    }

    /// Change the screen clear color
    pub fn set_clear_color(&mut self, color: Color) {
        self.config.graphics.clear_color = color;
        self.default_2d.render_pass.clear_color = color;
        self.default_3d.render_pass.clear_color = color;
    }

    /// Toggle the transform-info debug overlay
    pub fn set_visible_transform_info(&mut self, visible: bool) {
        self.config.debug.visible_transform_info = visible;
        self.dispatcher.set_visible_transform_info(visible);
    }

    /// Restrict transform updates to the subtree under `keep`, or stop them with `None`.
    ///
    /// Drawing continues; paused nodes keep their last world transform.
    pub fn pause(&mut self, keep: Option<NodeId>) {
        log::debug!("paused, updating {keep:?}");
        self.update_root = keep;
    }

    /// Resume transform updates from the root
    pub fn resume(&mut self) {
        self.update_root = Some(self.tree.root());
    }

    /// True when updates do not start from the root
    pub fn is_paused(&self) -> bool {
        self.update_root != Some(self.tree.root())
    }

    /// Implicit camera of one dimension, as of the last frame
    pub fn default_camera(&self, dimension: Dimension) -> &RenderedCamera {
        match dimension {
            Dimension::TwoD => &self.default_2d,
            Dimension::ThreeD => &self.default_3d,
        }
    }

    /// Run one frame: flush the queue, update transforms and cameras, refresh
    /// culling, then draw every camera pass between `begin_frame` and `end_frame`.
    pub fn try_update(
        &mut self,
        graphics: &mut dyn GraphicsLayer,
        culling: &mut dyn CullingSystem,
    ) -> Result<FrameStats, FrameError> {
        self.tree.flush_queue()?;

        if let Some(start) = self.update_root {
            self.tree.update_transforms(start);
        }

        let screen = graphics.screen_texture().size;
        if self.screen_size != Some(screen) {
            self.resize_default_cameras(screen);
        }
        self.refresh_camera_views(screen);

        culling.update_bounds(&self.tree);

        let begin = RenderPassParameter::new(self.config.graphics.clear_color, ClearFlags::COLOR | ClearFlags::DEPTH);
        if !graphics.begin_frame(&begin) {
            return Err(FrameError::BeginFrame);
        }

        let drawn = {
            let mut ctx = PassContext {
                tree: &self.tree,
                graphics: &mut *graphics,
                culling: &*culling,
                textures: &mut self.textures,
            };
            self.dispatcher.draw_frame(&mut ctx, &self.default_2d, &self.default_3d)
        };

        self.textures.recycle();
        let ended = graphics.end_frame();

        let stats = drawn?;
        if !ended {
            return Err(FrameError::EndFrame);
        }

        log::trace!("frame {}: {stats:?}", self.frame);
        self.frame += 1;
        Ok(stats)
    }

    /// [`try_update`](Self::try_update), reporting failure as `false`
    pub fn update(&mut self, graphics: &mut dyn GraphicsLayer, culling: &mut dyn CullingSystem) -> bool {
        match self.try_update(graphics, culling) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("frame {} failed: {e}", self.frame);
                false
            }
        }
    }

    /// Unregister the live tree and release pooled textures through `graphics`
    pub fn terminate(&mut self, graphics: &mut dyn GraphicsLayer) -> Result<(), EngineError> {
        self.tree.unregister_all()?;
        self.textures.release_all(graphics);
        log::info!("Scene engine terminated after {} frame(s)", self.frame);
        Ok(())
    }

    fn resize_default_cameras(&mut self, screen: TextureSize) {
        let half = Vec2::new(screen.width as f32, screen.height as f32) * 0.5;
        self.default_2d.view = Mat4::translation_2d(-half);

        let camera = &self.config.graphics.default_camera_3d;
        let eye = Vec3::from(camera.eye);
        let projection = Mat4::perspective_fov_lh(camera.fov_y, screen.aspect(), camera.near, camera.far);
        self.default_3d.view = projection * Mat4::look_at(eye, Vec3::zeros(), Vec3::y());

        log::debug!("default cameras resized to {}x{}", screen.width, screen.height);
        self.screen_size = Some(screen);
    }

    fn refresh_camera_views(&mut self, screen: TextureSize) {
        let indices = self.tree.indices();
        self.camera_scratch.clear();
        self.camera_scratch.extend(
            indices
                .cameras(Dimension::TwoD)
                .iter()
                .chain(indices.cameras(Dimension::ThreeD).iter()),
        );

        for &id in &self.camera_scratch {
            let Some(node) = self.tree.nodes.get_mut(id) else {
                continue;
            };
            let absolute = node.absolute_transform();
            if let Some(camera) = node.camera_mut() {
                camera.refresh_view(&absolute, screen);
            }
        }
    }
}
