//! Scene graph core
//!
//! The scene is a tree of [`Node`]s held by a [`SceneTree`]. Drawables are
//! indexed by z-order in a [`CameraGroupIndex`] per dimension, cameras in a
//! [`CameraRegistry`] per dimension. The frame dispatcher in
//! [`crate::render`] walks those indices once per camera.
//!
//! ```text
//! SceneTree (arena, pending attach/detach)
//!      ↓ flush
//! CameraGroupIndex ×2 / CameraRegistry ×2
//!      ↓ per camera
//! FrameDispatcher → GraphicsLayer
//! ```

mod camera;
mod camera_group_index;
mod camera_registry;
mod drawn;
mod error;
mod node;
mod transform;
mod tree;
mod visibility;

#[cfg(test)]
mod tests;

pub use camera::{Camera, Projection};
pub use camera_group_index::{BucketIter, CameraGroupIndex, MAX_CAMERA_GROUP_COUNT};
pub use camera_registry::CameraRegistry;
pub use drawn::{Dimension, Drawn, DrawnContent, DrawnKind, FullscreenPostEffect, PostEffect};
pub use error::{IndexError, SceneError};
pub use node::{Node, NodeRole, NodeStatus};
pub use transform::{Transform2D, Transform3D, TransformData};
pub use tree::{SceneIndices, SceneTree};
