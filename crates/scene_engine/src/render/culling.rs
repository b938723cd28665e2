//! Culling system contract
//!
//! Frustum culling lives outside the scene core. Once per frame the engine
//! lets the culling system refresh its bounds from the scene, then asks it,
//! per camera, which culling ids are visible.

use crate::scene::{NodeStatus, SceneTree};

use super::RenderedCamera;

/// Identity of a cullable drawable inside the culling system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CullingId(pub i32);

impl CullingId {
    /// Placeholder carried by cullable drawables until the engine allocates a real id
    pub const UNASSIGNED: CullingId = CullingId(-1);
}

/// Hands out culling ids in increasing order
#[derive(Debug, Default)]
pub struct CullingIdAllocator {
    next: i32,
}

impl CullingIdAllocator {
    /// Create an allocator starting at id 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused id
    pub fn allocate(&mut self) -> CullingId {
        let id = CullingId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Contract with the frustum-culling system
pub trait CullingSystem {
    /// Refresh bounds from the scene. Called once per frame after transform
    /// propagation and before any camera pass.
    fn update_bounds(&mut self, _tree: &SceneTree) {}

    /// Culling ids visible to `camera` this frame, in any order
    fn visible_ids(&self, camera: &RenderedCamera) -> &[CullingId];
}

/// Culling system that reports every registered cullable drawable as visible
#[derive(Debug, Default)]
pub struct PassThroughCulling {
    visible: Vec<CullingId>,
}

impl PassThroughCulling {
    /// Create an empty pass-through culler
    pub fn new() -> Self {
        Self::default()
    }
}

impl CullingSystem for PassThroughCulling {
    fn update_bounds(&mut self, tree: &SceneTree) {
        self.visible.clear();
        self.visible.extend(
            tree.iter()
                .filter(|(_, node)| node.status() == NodeStatus::Registered)
                .filter_map(|(_, node)| node.drawn()?.culling_id()),
        );
    }

    fn visible_ids(&self, _camera: &RenderedCamera) -> &[CullingId] {
        &self.visible
    }
}
