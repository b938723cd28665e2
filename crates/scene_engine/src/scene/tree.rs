//! Scene tree and its drawable / camera indices
//!
//! Nodes live in a slotmap arena. Structural edits are validated and linked
//! immediately, but entering or leaving the live tree is queued and applied by
//! [`SceneTree::flush_queue`]. Only flushed nodes are visible to the indices,
//! so the set of drawn nodes never changes in the middle of a frame.

use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use crate::foundation::collections::{NodeArena, NodeId};
use crate::foundation::math::Mat4;
use crate::render::CullingIdAllocator;

use super::{
    Camera, CameraGroupIndex, CameraRegistry, Dimension, DrawnContent, Node, NodeRole, NodeStatus, SceneError,
    Transform2D, Transform3D, TransformData,
};

/// One value per dimension
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct PerDimension<T> {
    pub(crate) two_d: T,
    pub(crate) three_d: T,
}

impl<T> PerDimension<T> {
    pub(crate) fn from_fn(mut f: impl FnMut(Dimension) -> T) -> Self {
        Self {
            two_d: f(Dimension::TwoD),
            three_d: f(Dimension::ThreeD),
        }
    }
}

impl<T> Index<Dimension> for PerDimension<T> {
    type Output = T;

    fn index(&self, dimension: Dimension) -> &T {
        match dimension {
            Dimension::TwoD => &self.two_d,
            Dimension::ThreeD => &self.three_d,
        }
    }
}

impl<T> IndexMut<Dimension> for PerDimension<T> {
    fn index_mut(&mut self, dimension: Dimension) -> &mut T {
        match dimension {
            Dimension::TwoD => &mut self.two_d,
            Dimension::ThreeD => &mut self.three_d,
        }
    }
}

/// Drawable indices and camera registries of both dimensions
#[derive(Debug, Default)]
pub struct SceneIndices {
    drawn: PerDimension<CameraGroupIndex<NodeId>>,
    cameras: PerDimension<CameraRegistry<NodeId>>,
}

impl SceneIndices {
    /// Z-ordered drawables of one dimension
    pub fn drawn(&self, dimension: Dimension) -> &CameraGroupIndex<NodeId> {
        &self.drawn[dimension]
    }

    /// Registered cameras of one dimension
    pub fn cameras(&self, dimension: Dimension) -> &CameraRegistry<NodeId> {
        &self.cameras[dimension]
    }

    fn insert(&mut self, id: NodeId, role: &NodeRole) -> Result<(), SceneError> {
        match role {
            NodeRole::Drawn(drawn) => self.drawn[drawn.dimension].register(id, drawn.z_order, drawn.camera_group)?,
            NodeRole::Camera(camera) => self.cameras[camera.dimension()].add_camera(id, camera.group)?,
            NodeRole::Group => {}
        }
        Ok(())
    }

    fn remove(&mut self, id: NodeId, role: &NodeRole) -> Result<(), SceneError> {
        match role {
            NodeRole::Drawn(drawn) => self.drawn[drawn.dimension].unregister(id, drawn.z_order, drawn.camera_group)?,
            NodeRole::Camera(camera) => self.cameras[camera.dimension()].remove_camera(id, camera.group)?,
            NodeRole::Group => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingOp {
    Attach(NodeId),
    Detach(NodeId),
}

/// Present in the indices: registered, or registered with a detach queued
fn is_indexed(status: NodeStatus) -> bool {
    matches!(status, NodeStatus::Registered | NodeStatus::WaitingRemoved)
}

/// The scene: node arena, root, pending mutations and indices
#[derive(Debug)]
pub struct SceneTree {
    pub(crate) nodes: NodeArena<Node>,
    root: NodeId,
    pending: VecDeque<PendingOp>,
    pub(crate) indices: SceneIndices,
    culling_ids: CullingIdAllocator,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    /// Tree holding only a registered root group
    pub fn new() -> Self {
        let mut nodes = NodeArena::<Node>::with_key();
        let mut root = Node::group();
        root.status = NodeStatus::Registered;
        let root = nodes.insert(root);

        Self {
            nodes,
            root,
            pending: VecDeque::new(),
            indices: SceneIndices::default(),
            culling_ids: CullingIdAllocator::new(),
        }
    }

    /// Root of the live tree
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Every node in the arena, attached or not
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Number of nodes in the arena, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is never removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drawable indices and camera registries
    pub fn indices(&self) -> &SceneIndices {
        &self.indices
    }

    /// Number of queued attach / detach operations
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Move a detached node into the arena. Cullable drawables get their culling id here.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        node.parent = None;
        node.children.clear();
        node.status = NodeStatus::Free;
        if let Some(drawn) = node.drawn_mut() {
            if drawn.culling_id().is_some() {
                drawn.assign_culling_id(self.culling_ids.allocate());
            }
        }
        self.nodes.insert(node)
    }

    /// Link `child` under `parent`.
    ///
    /// If `parent` is in the live tree the child subtree is registered by
    /// the next [`flush_queue`](Self::flush_queue).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let parent_status = self.node(parent)?.status;
        let child_node = self.node(child)?;

        if child == self.root {
            return Err(SceneError::RootImmutable);
        }
        if child_node.parent.is_some() || child_node.status != NodeStatus::Free {
            return Err(SceneError::AlreadyHasParent { child });
        }
        if parent == child || self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }

        match parent_status {
            NodeStatus::Registered => {
                self.mark_subtree(child, NodeStatus::Free, NodeStatus::WaitingAdded);
                self.pending.push_back(PendingOp::Attach(child));
            }
            // picked up by the registration of the pending ancestor
            NodeStatus::WaitingAdded => self.mark_subtree(child, NodeStatus::Free, NodeStatus::WaitingAdded),
            NodeStatus::Free | NodeStatus::WaitingRemoved => {}
        }

        log::trace!("queued attach of {child:?} under {parent:?}");
        Ok(())
    }

    /// Unlink `child` from `parent`.
    ///
    /// A registered child stays drawn until the next
    /// [`flush_queue`](Self::flush_queue) unregisters its subtree.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.node(parent)?;
        let (current_parent, status) = {
            let node = self.node(child)?;
            (node.parent, node.status)
        };
        if current_parent != Some(parent) {
            return Err(SceneError::NotAChild { parent, child });
        }

        match status {
            NodeStatus::Registered => {
                self.mark_subtree(child, NodeStatus::Registered, NodeStatus::WaitingRemoved);
                self.pending.push_back(PendingOp::Detach(child));
            }
            NodeStatus::WaitingAdded => {
                self.mark_subtree(child, NodeStatus::WaitingAdded, NodeStatus::Free);
                self.unlink(child);
            }
            NodeStatus::Free => self.unlink(child),
            NodeStatus::WaitingRemoved => return Err(SceneError::PendingRemoval(child)),
        }

        log::trace!("queued detach of {child:?} from {parent:?}");
        Ok(())
    }

    /// Apply queued attaches and detaches in the order they were requested
    pub fn flush_queue(&mut self) -> Result<(), SceneError> {
        while let Some(op) = self.pending.pop_front() {
            match op {
                PendingOp::Attach(child) => {
                    let live_parent = self
                        .nodes
                        .get(child)
                        .filter(|node| node.status == NodeStatus::WaitingAdded)
                        .and_then(|node| node.parent)
                        .and_then(|parent| self.nodes.get(parent))
                        .is_some_and(|parent| parent.status == NodeStatus::Registered);
                    if live_parent {
                        self.register_subtree(child)?;
                    }
                }
                PendingOp::Detach(child) => {
                    let waiting = self.nodes.get(child).is_some_and(|node| node.status == NodeStatus::WaitingRemoved);
                    if waiting {
                        self.unregister_subtree(child)?;
                        self.unlink(child);
                        self.refresh_visibility(child);
                    }
                }
            }
        }
        Ok(())
    }

    /// Remove a detached subtree from the arena
    pub fn destroy(&mut self, id: NodeId) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        if self.node(id)?.status != NodeStatus::Free {
            return Err(SceneError::StillAttached(id));
        }

        self.unlink(id);
        let subtree = self.subtree(id);
        for node in &subtree {
            self.nodes.remove(*node);
        }
        log::debug!("destroyed {} node(s) under {id:?}", subtree.len());
        Ok(())
    }

    /// Change a drawable's z-order, moving it between index buckets if registered
    pub fn set_z_order(&mut self, id: NodeId, z_order: i32) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let indexed = is_indexed(node.status);
        let drawn = node.drawn_mut().ok_or(SceneError::NotDrawn(id))?;
        if drawn.z_order == z_order {
            return Ok(());
        }
        if indexed {
            self.indices.drawn[drawn.dimension].update_z_order(id, drawn.z_order, z_order)?;
        }
        drawn.z_order = z_order;
        Ok(())
    }

    /// Change a drawable's camera-group mask
    pub fn set_camera_group(&mut self, id: NodeId, camera_group: u64) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let indexed = is_indexed(node.status);
        let drawn = node.drawn_mut().ok_or(SceneError::NotDrawn(id))?;
        if drawn.camera_group == camera_group {
            return Ok(());
        }
        if indexed {
            self.indices.drawn[drawn.dimension].update_camera_group(id, drawn.camera_group, camera_group)?;
        }
        drawn.camera_group = camera_group;
        Ok(())
    }

    /// Change a camera's group mask
    pub fn set_camera_group_mask(&mut self, id: NodeId, group: u64) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let indexed = is_indexed(node.status);
        let camera = node.camera_mut().ok_or(SceneError::NotCamera(id))?;
        if camera.group == group {
            return Ok(());
        }
        if indexed {
            self.indices.cameras[camera.dimension()].update_group(id, camera.group, group)?;
        }
        camera.group = group;
        Ok(())
    }

    /// Toggle a drawable's local visibility and re-derive its subtree
    pub fn set_is_drawn(&mut self, id: NodeId, is_drawn: bool) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let drawn = node.drawn_mut().ok_or(SceneError::NotDrawn(id))?;
        if drawn.is_drawn == is_drawn {
            return Ok(());
        }
        drawn.is_drawn = is_drawn;
        self.refresh_visibility(id);
        Ok(())
    }

    /// Mutable 2D transform; changes are picked up by the next transform update
    pub fn transform_2d_mut(&mut self, id: NodeId) -> Result<&mut Transform2D, SceneError> {
        match self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?.transform.as_mut() {
            Some(TransformData::TwoD(transform)) => Ok(transform),
            _ => Err(SceneError::MissingTransform { node: id, dimension: Dimension::TwoD }),
        }
    }

    /// Mutable 3D transform; changes are picked up by the next transform update
    pub fn transform_3d_mut(&mut self, id: NodeId) -> Result<&mut Transform3D, SceneError> {
        match self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))?.transform.as_mut() {
            Some(TransformData::ThreeD(transform)) => Ok(transform),
            _ => Err(SceneError::MissingTransform { node: id, dimension: Dimension::ThreeD }),
        }
    }

    /// Mutable camera parameters; change the group through [`set_camera_group_mask`](Self::set_camera_group_mask)
    pub fn camera_mut(&mut self, id: NodeId) -> Result<&mut Camera, SceneError> {
        self.nodes
            .get_mut(id)
            .ok_or(SceneError::UnknownNode(id))?
            .camera_mut()
            .ok_or(SceneError::NotCamera(id))
    }

    /// Mutable payload of a cullable or plain drawable
    pub fn content_mut(&mut self, id: NodeId) -> Result<&mut DrawnContent, SceneError> {
        self.nodes
            .get_mut(id)
            .ok_or(SceneError::UnknownNode(id))?
            .drawn_mut()
            .and_then(|drawn| drawn.content_mut())
            .ok_or(SceneError::NotDrawn(id))
    }

    /// Recompose world transforms of the subtree under `start`.
    ///
    /// Only dirty transforms recompute their local matrix; everything below a
    /// recomputed transform is recomposed.
    pub fn update_transforms(&mut self, start: NodeId) {
        self.propagate(start, false);
    }

    /// Unregister every live node below the root; the tree is empty afterwards
    pub fn unregister_all(&mut self) -> Result<(), SceneError> {
        self.pending.clear();
        let children = self.nodes.get(self.root).map(|root| root.children.clone()).unwrap_or_default();
        for child in children {
            if self.nodes.get(child).is_some_and(|node| node.status == NodeStatus::Registered) {
                self.mark_subtree(child, NodeStatus::Registered, NodeStatus::WaitingRemoved);
            }
            self.unregister_subtree(child)?;
            self.unlink(child);
        }
        Ok(())
    }

    /// Strict ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes.get(id).and_then(|node| node.parent), |current| {
            self.nodes.get(*current).and_then(|node| node.parent)
        })
    }

    /// `start` and its descendants in pre-order
    pub fn subtree(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode(id))
    }

    fn unlink(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|c| *c != child);
        }
    }

    fn mark_subtree(&mut self, start: NodeId, from: NodeStatus, to: NodeStatus) {
        for id in self.subtree(start) {
            if let Some(node) = self.nodes.get_mut(id).filter(|node| node.status == from) {
                node.status = to;
            }
        }
    }

    fn register_subtree(&mut self, start: NodeId) -> Result<(), SceneError> {
        let mut registered = 0usize;
        for id in self.subtree(start) {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if node.status != NodeStatus::WaitingAdded {
                continue;
            }
            self.indices.insert(id, &node.role)?;
            node.status = NodeStatus::Registered;
            registered += 1;
        }

        self.refresh_visibility(start);
        self.propagate(start, true);
        log::debug!("registered {registered} node(s) under {start:?}");
        Ok(())
    }

    fn unregister_subtree(&mut self, start: NodeId) -> Result<(), SceneError> {
        let mut unregistered = 0usize;
        for id in self.subtree(start) {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if is_indexed(node.status) {
                self.indices.remove(id, &node.role)?;
                unregistered += 1;
            }
            node.status = NodeStatus::Free;
        }
        log::debug!("unregistered {unregistered} node(s) under {start:?}");
        Ok(())
    }

    /// Matrix a node composes with: inherited matrix of the nearest strict
    /// ancestor carrying a transform of the same dimension
    fn inherited_input(&self, id: NodeId, dimension: Dimension) -> Mat4 {
        self.ancestors(id)
            .filter_map(|ancestor| self.nodes.get(ancestor)?.transform.as_ref())
            .find(|transform| transform.dimension() == dimension)
            .map_or_else(Mat4::identity, |transform| *transform.inherited())
    }

    fn propagate(&mut self, start: NodeId, force: bool) {
        if !self.nodes.contains_key(start) {
            return;
        }
        let seed = PerDimension::from_fn(|dimension| (self.inherited_input(start, dimension), force));

        let mut stack = vec![(start, seed)];
        while let Some((id, mut state)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if let Some(transform) = node.transform.as_mut() {
                let (parent, parent_changed) = state[transform.dimension()];
                let changed = transform.propagate(&parent, parent_changed);
                state[transform.dimension()] = (*transform.inherited(), changed);
            }
            stack.extend(node.children.iter().rev().map(|child| (*child, state)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec2, Vec3};
    use approx::assert_relative_eq;

    fn origin(tree: &SceneTree, id: NodeId) -> Vec3 {
        tree.get(id)
            .unwrap()
            .absolute_transform()
            .transform_point(&nalgebra::Point3::origin())
            .coords
    }

    #[test]
    fn test_attach_is_deferred_until_flush() {
        let mut tree = SceneTree::new();
        let sprite = tree.insert(Node::sprite(None, Vec2::new(1.0, 1.0)).with_z_order(3));

        tree.add_child(tree.root(), sprite).unwrap();
        assert_eq!(tree.get(sprite).unwrap().status(), NodeStatus::WaitingAdded);
        assert!(!tree.indices().drawn(Dimension::TwoD).is_registered(sprite));

        tree.flush_queue().unwrap();
        assert_eq!(tree.get(sprite).unwrap().status(), NodeStatus::Registered);
        assert!(tree.indices().drawn(Dimension::TwoD).contains(sprite, None));
        assert_eq!(tree.pending_len(), 0);
    }

    #[test]
    fn test_detach_unregisters_whole_subtree() {
        let mut tree = SceneTree::new();
        let group = tree.insert(Node::group());
        let a = tree.insert(Node::text("a").with_camera_group(0b1));
        let camera = tree.insert(Node::camera_2d(Camera::new_2d()).with_camera_group(0b1));
        tree.add_child(group, a).unwrap();
        tree.add_child(group, camera).unwrap();
        assert_eq!(tree.get(a).unwrap().status(), NodeStatus::Free);

        tree.add_child(tree.root(), group).unwrap();
        tree.flush_queue().unwrap();
        assert!(tree.indices().drawn(Dimension::TwoD).contains(a, Some(0)));
        assert_eq!(tree.indices().cameras(Dimension::TwoD).cameras(0), &[camera]);

        tree.remove_child(tree.root(), group).unwrap();
        assert_eq!(tree.get(a).unwrap().status(), NodeStatus::WaitingRemoved);
        assert!(tree.indices().drawn(Dimension::TwoD).is_registered(a));

        tree.flush_queue().unwrap();
        assert!(tree.indices().drawn(Dimension::TwoD).is_empty());
        assert_eq!(tree.indices().cameras(Dimension::TwoD).count(), 0);
        assert_eq!(tree.get(group).unwrap().parent(), None);
        assert_eq!(tree.get(a).unwrap().parent(), Some(group));
        assert_eq!(tree.get(a).unwrap().status(), NodeStatus::Free);
    }

    #[test]
    fn test_remove_before_flush_cancels_attach() {
        let mut tree = SceneTree::new();
        let sprite = tree.insert(Node::sprite(None, Vec2::zeros()));
        tree.add_child(tree.root(), sprite).unwrap();
        tree.remove_child(tree.root(), sprite).unwrap();
        tree.flush_queue().unwrap();

        assert_eq!(tree.get(sprite).unwrap().status(), NodeStatus::Free);
        assert!(tree.indices().drawn(Dimension::TwoD).is_empty());
        tree.destroy(sprite).unwrap();
        assert!(tree.get(sprite).is_none());
    }

    #[test]
    fn test_structural_misuse() {
        let mut tree = SceneTree::new();
        let root = tree.root();
        let a = tree.insert(Node::group());
        let b = tree.insert(Node::group());
        tree.add_child(a, b).unwrap();

        assert_eq!(tree.add_child(root, b), Err(SceneError::AlreadyHasParent { child: b }));
        assert_eq!(tree.add_child(b, a), Err(SceneError::WouldCreateCycle { parent: b, child: a }));
        assert_eq!(tree.add_child(a, a), Err(SceneError::WouldCreateCycle { parent: a, child: a }));
        assert_eq!(tree.add_child(a, root), Err(SceneError::RootImmutable));
        assert_eq!(tree.remove_child(root, b), Err(SceneError::NotAChild { parent: root, child: b }));
        assert_eq!(tree.destroy(root), Err(SceneError::RootImmutable));
        assert_eq!(tree.set_z_order(a, 1), Err(SceneError::NotDrawn(a)));
        assert_eq!(tree.set_camera_group_mask(a, 1), Err(SceneError::NotCamera(a)));

        tree.add_child(root, a).unwrap();
        tree.flush_queue().unwrap();
        assert_eq!(tree.destroy(a), Err(SceneError::StillAttached(a)));
        tree.remove_child(root, a).unwrap();
        assert_eq!(tree.remove_child(root, a), Err(SceneError::PendingRemoval(a)));
    }

    #[test]
    fn test_setters_keep_index_in_sync() {
        let mut tree = SceneTree::new();
        let sprite = tree.insert(Node::sprite(None, Vec2::zeros()).with_z_order(1).with_camera_group(0b1));
        tree.add_child(tree.root(), sprite).unwrap();

        // before the flush only the node changes
        tree.set_z_order(sprite, 2).unwrap();
        tree.flush_queue().unwrap();
        let index = tree.indices().drawn(Dimension::TwoD);
        assert!(index.bucket(None, 2).is_some_and(|b| b.contains(&sprite)));

        tree.set_z_order(sprite, -4).unwrap();
        tree.set_camera_group(sprite, 0b10).unwrap();
        let index = tree.indices().drawn(Dimension::TwoD);
        assert!(index.bucket(Some(1), -4).is_some_and(|b| b.contains(&sprite)));
        assert!(!index.contains(sprite, Some(0)));
        assert!(index.bucket(None, 2).is_none());
    }

    #[test]
    fn test_transform_inherits_from_same_dimension_ancestor() {
        let mut tree = SceneTree::new();
        let outer = tree.insert(Node::transform_2d(Transform2D::new().with_position(Vec2::new(10.0, 0.0))));
        let middle = tree.insert(Node::transform_3d(Transform3D::new().with_position(Vec3::new(0.0, 0.0, 9.0))));
        let inner = tree.insert(Node::sprite(None, Vec2::zeros()));
        tree.add_child(tree.root(), outer).unwrap();
        tree.add_child(outer, middle).unwrap();
        tree.add_child(middle, inner).unwrap();
        tree.transform_2d_mut(inner).unwrap().set_position(Vec2::new(1.0, 2.0));
        tree.flush_queue().unwrap();

        assert_relative_eq!(origin(&tree, inner), Vec3::new(11.0, 2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(origin(&tree, middle), Vec3::new(0.0, 0.0, 9.0), epsilon = 1e-5);

        tree.transform_2d_mut(outer).unwrap().set_position(Vec2::new(20.0, 0.0));
        tree.update_transforms(tree.root());
        assert_relative_eq!(origin(&tree, inner), Vec3::new(21.0, 2.0, 0.0), epsilon = 1e-5);

        assert!(matches!(tree.transform_3d_mut(inner), Err(SceneError::MissingTransform { .. })));
    }

    #[test]
    fn test_plain_group_passes_transform_through() {
        let mut tree = SceneTree::new();
        let outer = tree.insert(Node::transform_2d(Transform2D::new().with_position(Vec2::new(10.0, 0.0))));
        let group = tree.insert(Node::group());
        let leaf = tree.insert(Node::sprite(None, Vec2::zeros()));
        tree.add_child(tree.root(), outer).unwrap();
        tree.add_child(outer, group).unwrap();
        tree.add_child(group, leaf).unwrap();
        tree.flush_queue().unwrap();

        assert!(tree.get(group).unwrap().transform().is_none());
        assert_relative_eq!(origin(&tree, leaf), Vec3::new(10.0, 0.0, 0.0), epsilon = 1e-5);

        // only the ancestor above the group is dirty
        tree.transform_2d_mut(outer).unwrap().set_position(Vec2::new(30.0, 0.0));
        tree.update_transforms(tree.root());
        assert_relative_eq!(origin(&tree, leaf), Vec3::new(30.0, 0.0, 0.0), epsilon = 1e-5);

        tree.transform_2d_mut(leaf).unwrap().set_position(Vec2::new(0.0, 4.0));
        tree.update_transforms(tree.root());
        assert_relative_eq!(origin(&tree, leaf), Vec3::new(30.0, 4.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_unregister_all_empties_indices() {
        let mut tree = SceneTree::new();
        let a = tree.insert(Node::mesh(3));
        let b = tree.insert(Node::camera_3d(Camera::new_3d()));
        tree.add_child(tree.root(), a).unwrap();
        tree.add_child(a, b).unwrap();
        tree.flush_queue().unwrap();

        tree.unregister_all().unwrap();
        assert!(tree.indices().drawn(Dimension::ThreeD).is_empty());
        assert_eq!(tree.indices().cameras(Dimension::ThreeD).count(), 0);
        assert!(tree.get(tree.root()).unwrap().children().is_empty());
        assert_eq!(tree.get(b).unwrap().status(), NodeStatus::Free);
    }

    #[test]
    fn test_culling_ids_assigned_on_insert() {
        let mut tree = SceneTree::new();
        let a = tree.insert(Node::sprite(None, Vec2::zeros()));
        let cmd = tree.insert(Node::command(Dimension::TwoD, 1));
        let b = tree.insert(Node::text("b"));

        let id = |n| tree.get(n).unwrap().drawn().unwrap().culling_id();
        assert_eq!(id(a), Some(crate::render::CullingId(0)));
        assert_eq!(id(cmd), None);
        assert_eq!(id(b), Some(crate::render::CullingId(1)));
    }
}
