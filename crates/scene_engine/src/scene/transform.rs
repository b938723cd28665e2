//! Local and world transforms of scene nodes
//!
//! Each transform keeps its local parameters and three cached matrices:
//!
//! - `local`: translate × rotate × scale, recomputed only when dirty
//! - `inherited`: ancestor inherited × local, what children compose with
//! - `absolute`: inherited × translate(-center) (× unit scale in 3D), what is drawn
//!
//! Setters that change a value mark the transform dirty; writing the value it
//! already holds does nothing. The tree walk in [`SceneTree`](super::SceneTree)
//! decides when the cached matrices are recomposed.

use crate::foundation::math::{Mat4, Mat4Ext, Quat, Vec2, Vec3};

use super::Dimension;

/// 2D transform: position, angle in degrees, scale and center offset
#[derive(Debug, Clone, PartialEq)]
pub struct Transform2D {
    position: Vec2,
    angle: f32,
    scale: Vec2,
    center: Vec2,
    local: Mat4,
    inherited: Mat4,
    absolute: Mat4,
    dirty: bool,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            angle: 0.0,
            scale: Vec2::new(1.0, 1.0),
            center: Vec2::zeros(),
            local: Mat4::identity(),
            inherited: Mat4::identity(),
            absolute: Mat4::identity(),
            dirty: true,
        }
    }
}

impl Transform2D {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.set_position(position);
        self
    }

    /// Builder: angle in degrees
    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.set_angle(degrees);
        self
    }

    /// Builder: scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.set_scale(scale);
        self
    }

    /// Builder: center offset
    pub fn with_center(mut self, center: Vec2) -> Self {
        self.set_center(center);
        self
    }

    /// Local position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Set the local position
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.dirty = true;
        }
    }

    /// Rotation in degrees
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Set the rotation in degrees
    pub fn set_angle(&mut self, degrees: f32) {
        if self.angle != degrees {
            self.angle = degrees;
            self.dirty = true;
        }
    }

    /// Local scale
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Set the local scale
    pub fn set_scale(&mut self, scale: Vec2) {
        if self.scale != scale {
            self.scale = scale;
            self.dirty = true;
        }
    }

    /// Pivot of rotation and scale, in local units
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Set the pivot
    pub fn set_center(&mut self, center: Vec2) {
        if self.center != center {
            self.center = center;
            self.dirty = true;
        }
    }

    /// Cached local matrix
    pub fn local(&self) -> &Mat4 {
        &self.local
    }

    /// Ancestor transforms composed with the local matrix
    pub fn inherited(&self) -> &Mat4 {
        &self.inherited
    }

    /// World matrix used for drawing
    pub fn absolute(&self) -> &Mat4 {
        &self.absolute
    }

    /// True when a parameter changed since the last recompute
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn recompute_local(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.local = Mat4::transform_2d(self.position, self.angle, self.scale);
        self.dirty = false;
        true
    }

    fn compose(&mut self, parent: &Mat4) {
        self.inherited = parent * self.local;
        self.absolute = self.inherited * Mat4::translation_2d(-self.center);
    }
}

/// 3D transform: position, rotation, scale, center offset and unit scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform3D {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    center: Vec3,
    unit_scale: f32,
    local: Mat4,
    inherited: Mat4,
    absolute: Mat4,
    dirty: bool,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            center: Vec3::zeros(),
            unit_scale: 1.0,
            local: Mat4::identity(),
            inherited: Mat4::identity(),
            absolute: Mat4::identity(),
            dirty: true,
        }
    }
}

impl Transform3D {
    /// Pixel-to-world factor of 3D sprites and text
    pub const PIXEL_UNIT_SCALE: f32 = 0.01;

    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder: rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Builder: scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Builder: center offset
    pub fn with_center(mut self, center: Vec3) -> Self {
        self.set_center(center);
        self
    }

    /// Builder: extra uniform scale applied after the center offset
    pub fn with_unit_scale(mut self, unit_scale: f32) -> Self {
        self.unit_scale = unit_scale;
        self.dirty = true;
        self
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Set the local position
    pub fn set_position(&mut self, position: Vec3) {
        if self.position != position {
            self.position = position;
            self.dirty = true;
        }
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Set the local rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.dirty = true;
        }
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set the local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        if self.scale != scale {
            self.scale = scale;
            self.dirty = true;
        }
    }

    /// Pivot of rotation and scale
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Set the pivot
    pub fn set_center(&mut self, center: Vec3) {
        if self.center != center {
            self.center = center;
            self.dirty = true;
        }
    }

    /// Extra uniform scale of the absolute matrix
    pub fn unit_scale(&self) -> f32 {
        self.unit_scale
    }

    /// Cached local matrix
    pub fn local(&self) -> &Mat4 {
        &self.local
    }

    /// Ancestor transforms composed with the local matrix
    pub fn inherited(&self) -> &Mat4 {
        &self.inherited
    }

    /// World matrix used for drawing
    pub fn absolute(&self) -> &Mat4 {
        &self.absolute
    }

    /// True when a parameter changed since the last recompute
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn recompute_local(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.local = Mat4::transform_3d(self.position, &self.rotation, self.scale);
        self.dirty = false;
        true
    }

    fn compose(&mut self, parent: &Mat4) {
        self.inherited = parent * self.local;
        self.absolute = self.inherited * Mat4::new_translation(&-self.center);
        if self.unit_scale != 1.0 {
            self.absolute *= Mat4::new_scaling(self.unit_scale);
        }
    }
}

/// Transform of either dimension
#[derive(Debug, Clone, PartialEq)]
pub enum TransformData {
    /// 2D transform
    TwoD(Transform2D),
    /// 3D transform
    ThreeD(Transform3D),
}

impl TransformData {
    /// Dimension this transform composes in
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::TwoD(_) => Dimension::TwoD,
            Self::ThreeD(_) => Dimension::ThreeD,
        }
    }

    /// World matrix used for drawing
    pub fn absolute(&self) -> &Mat4 {
        match self {
            Self::TwoD(t) => t.absolute(),
            Self::ThreeD(t) => t.absolute(),
        }
    }

    /// Matrix passed down to same-dimension descendants
    pub fn inherited(&self) -> &Mat4 {
        match self {
            Self::TwoD(t) => t.inherited(),
            Self::ThreeD(t) => t.inherited(),
        }
    }

    /// True when a parameter changed since the last recompute
    pub fn is_dirty(&self) -> bool {
        match self {
            Self::TwoD(t) => t.is_dirty(),
            Self::ThreeD(t) => t.is_dirty(),
        }
    }

    /// One step of the propagation walk.
    ///
    /// Recomputes the local matrix if dirty and recomposes against `parent`
    /// when either the local matrix or an ancestor changed. Returns whether
    /// the inherited matrix changed, which descendants must honor.
    pub(crate) fn propagate(&mut self, parent: &Mat4, parent_changed: bool) -> bool {
        let local_changed = match self {
            Self::TwoD(t) => t.recompute_local(),
            Self::ThreeD(t) => t.recompute_local(),
        };
        let changed = local_changed || parent_changed;
        if changed {
            match self {
                Self::TwoD(t) => t.compose(parent),
                Self::ThreeD(t) => t.compose(parent),
            }
        }
        changed
    }
}
