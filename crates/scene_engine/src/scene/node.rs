//! Scene nodes and their constructors
//!
//! A node is a tree position plus an optional transform and one role: a
//! plain group, a drawable or a camera. Constructors below cover the node
//! kinds the engine ships with; anything else can be built from
//! [`Node::new`].

use crate::foundation::collections::NodeId;
use crate::foundation::math::{Mat4, Vec2};
use crate::render::TextureId;

use super::{
    Camera, Dimension, Drawn, DrawnContent, DrawnKind, PostEffect, Transform2D, Transform3D, TransformData,
};

/// Lifecycle of a node with respect to the live tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeStatus {
    /// Not attached to the live tree
    #[default]
    Free,
    /// Attach queued, applied by the next flush
    WaitingAdded,
    /// In the live tree and in every applicable index
    Registered,
    /// Detach queued, applied by the next flush
    WaitingRemoved,
}

/// What a node contributes to rendering
#[derive(Debug)]
pub enum NodeRole {
    /// Structural node only
    Group,
    /// Drawable
    Drawn(Drawn),
    /// Camera
    Camera(Camera),
}

/// One node of the scene tree
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) status: NodeStatus,
    pub(crate) transform: Option<TransformData>,
    pub(crate) role: NodeRole,
}

impl Node {
    /// Detached node with the given transform and role
    pub fn new(transform: Option<TransformData>, role: NodeRole) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            status: NodeStatus::Free,
            transform,
            role,
        }
    }

    /// Grouping node without transform
    pub fn group() -> Self {
        Self::new(None, NodeRole::Group)
    }

    /// Grouping node carrying a 2D transform
    pub fn transform_2d(transform: Transform2D) -> Self {
        Self::new(Some(TransformData::TwoD(transform)), NodeRole::Group)
    }

    /// Grouping node carrying a 3D transform
    pub fn transform_3d(transform: Transform3D) -> Self {
        Self::new(Some(TransformData::ThreeD(transform)), NodeRole::Group)
    }

    /// 2D sprite
    pub fn sprite(texture: Option<TextureId>, size: Vec2) -> Self {
        Self::cullable_2d(DrawnContent::Sprite { texture, size })
    }

    /// 2D filled polygon
    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        Self::cullable_2d(DrawnContent::Polygon { vertices })
    }

    /// 2D text
    pub fn text(text: impl Into<String>) -> Self {
        Self::cullable_2d(DrawnContent::Text { text: text.into() })
    }

    /// Sprite placed in 3D space, one pixel per [`Transform3D::PIXEL_UNIT_SCALE`] world units
    pub fn sprite_3d(texture: Option<TextureId>, size: Vec2) -> Self {
        Self::cullable_3d(
            DrawnContent::Sprite { texture, size },
            Transform3D::new().with_unit_scale(Transform3D::PIXEL_UNIT_SCALE),
        )
    }

    /// Text placed in 3D space, one pixel per [`Transform3D::PIXEL_UNIT_SCALE`] world units
    pub fn text_3d(text: impl Into<String>) -> Self {
        Self::cullable_3d(
            DrawnContent::Text { text: text.into() },
            Transform3D::new().with_unit_scale(Transform3D::PIXEL_UNIT_SCALE),
        )
    }

    /// Polygon in 3D space
    pub fn polygon_3d(vertices: Vec<Vec2>) -> Self {
        Self::cullable_3d(DrawnContent::Polygon { vertices }, Transform3D::new())
    }

    /// 3D triangle mesh
    pub fn mesh(vertex_count: u32) -> Self {
        Self::cullable_3d(DrawnContent::Mesh { vertex_count }, Transform3D::new())
    }

    /// User command drawable; never culled
    pub fn command(dimension: Dimension, id: u64) -> Self {
        let transform = match dimension {
            Dimension::TwoD => TransformData::TwoD(Transform2D::new()),
            Dimension::ThreeD => TransformData::ThreeD(Transform3D::new()),
        };
        let kind = DrawnKind::Plain { content: DrawnContent::Command { id } };
        Self::new(Some(transform), NodeRole::Drawn(Drawn::new(dimension, kind)))
    }

    /// Post-effect drawable
    pub fn post_effect(dimension: Dimension, effect: impl PostEffect + 'static) -> Self {
        let drawn = Drawn::new(dimension, DrawnKind::PostEffect(Box::new(effect)));
        Self::new(None, NodeRole::Drawn(drawn))
    }

    /// 2D camera
    pub fn camera_2d(camera: Camera) -> Self {
        Self::new(Some(TransformData::TwoD(Transform2D::new())), NodeRole::Camera(camera))
    }

    /// 3D camera
    pub fn camera_3d(camera: Camera) -> Self {
        Self::new(Some(TransformData::ThreeD(Transform3D::new())), NodeRole::Camera(camera))
    }

    fn cullable_2d(content: DrawnContent) -> Self {
        let drawn = Drawn::cullable(Dimension::TwoD, content);
        Self::new(Some(TransformData::TwoD(Transform2D::new())), NodeRole::Drawn(drawn))
    }

    fn cullable_3d(content: DrawnContent, transform: Transform3D) -> Self {
        let drawn = Drawn::cullable(Dimension::ThreeD, content);
        Self::new(Some(TransformData::ThreeD(transform)), NodeRole::Drawn(drawn))
    }

    /// Builder: z-order of a drawable; ignored for other roles
    pub fn with_z_order(mut self, z_order: i32) -> Self {
        if let NodeRole::Drawn(drawn) = &mut self.role {
            drawn.z_order = z_order;
        }
        self
    }

    /// Builder: camera-group mask of a drawable or camera; ignored for groups
    pub fn with_camera_group(mut self, group: u64) -> Self {
        match &mut self.role {
            NodeRole::Drawn(drawn) => drawn.camera_group = group,
            NodeRole::Camera(camera) => camera.group = group,
            NodeRole::Group => {}
        }
        self
    }

    /// Builder: local visibility of a drawable
    pub fn with_is_drawn(mut self, is_drawn: bool) -> Self {
        if let NodeRole::Drawn(drawn) = &mut self.role {
            drawn.is_drawn = is_drawn;
            drawn.is_drawn_actually = is_drawn;
        }
        self
    }

    /// Builder: replace the 2D transform (no-op on nodes without one)
    pub fn with_transform_2d(mut self, transform: Transform2D) -> Self {
        if let Some(TransformData::TwoD(t)) = &mut self.transform {
            *t = transform;
        }
        self
    }

    /// Builder: replace the 3D transform, keeping the node's unit scale
    pub fn with_transform_3d(mut self, transform: Transform3D) -> Self {
        if let Some(TransformData::ThreeD(t)) = &mut self.transform {
            let unit_scale = t.unit_scale();
            *t = transform.with_unit_scale(unit_scale);
        }
        self
    }

    /// Parent in the tree
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in attach order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Lifecycle state
    pub fn status(&self) -> NodeStatus {
        self.status
    }

    /// Transform, if the node has one
    pub fn transform(&self) -> Option<&TransformData> {
        self.transform.as_ref()
    }

    /// World matrix; identity for nodes without a transform
    pub fn absolute_transform(&self) -> Mat4 {
        self.transform.as_ref().map_or_else(Mat4::identity, |t| *t.absolute())
    }

    /// Role
    pub fn role(&self) -> &NodeRole {
        &self.role
    }

    /// Drawable capability
    pub fn drawn(&self) -> Option<&Drawn> {
        match &self.role {
            NodeRole::Drawn(drawn) => Some(drawn),
            NodeRole::Group | NodeRole::Camera(_) => None,
        }
    }

    pub(crate) fn drawn_mut(&mut self) -> Option<&mut Drawn> {
        match &mut self.role {
            NodeRole::Drawn(drawn) => Some(drawn),
            NodeRole::Group | NodeRole::Camera(_) => None,
        }
    }

    /// Camera capability
    pub fn camera(&self) -> Option<&Camera> {
        match &self.role {
            NodeRole::Camera(camera) => Some(camera),
            NodeRole::Group | NodeRole::Drawn(_) => None,
        }
    }

    pub(crate) fn camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.role {
            NodeRole::Camera(camera) => Some(camera),
            NodeRole::Group | NodeRole::Drawn(_) => None,
        }
    }

    /// True when the node is in the live tree
    pub fn is_registered(&self) -> bool {
        self.status == NodeStatus::Registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_apply_to_matching_role() {
        let sprite = Node::sprite(None, Vec2::new(8.0, 8.0))
            .with_z_order(7)
            .with_camera_group(0b10)
            .with_is_drawn(false);
        let drawn = sprite.drawn().unwrap();
        assert_eq!(drawn.z_order(), 7);
        assert_eq!(drawn.camera_group(), 0b10);
        assert!(!drawn.is_drawn());
        assert!(!drawn.is_drawn_actually());

        let group = Node::group().with_z_order(3).with_camera_group(1);
        assert!(group.drawn().is_none());
        assert!(group.transform().is_none());

        let camera = Node::camera_2d(Camera::new_2d()).with_camera_group(0b1);
        assert_eq!(camera.camera().unwrap().group(), 0b1);
    }

    #[test]
    fn test_3d_text_keeps_unit_scale() {
        let node = Node::text_3d("hi").with_transform_3d(Transform3D::new());
        match node.transform() {
            Some(TransformData::ThreeD(t)) => assert_eq!(t.unit_scale(), Transform3D::PIXEL_UNIT_SCALE),
            other => panic!("unexpected transform {other:?}"),
        }
        assert_eq!(node.drawn().unwrap().dimension(), Dimension::ThreeD);
    }

    #[test]
    fn test_command_is_plain() {
        let node = Node::command(Dimension::TwoD, 42);
        assert!(matches!(node.drawn().unwrap().kind(), DrawnKind::Plain { .. }));
        assert_eq!(node.drawn().unwrap().culling_id(), None);
        assert_eq!(node.status(), NodeStatus::Free);
    }
}
