//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the handful of matrix builders the scene
//! needs. All matrices are column-vector convention (`M * v`) and compose as
//! `translate * rotate * scale`.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}

/// Extension trait for Mat4 with the builders used by scene transforms and cameras
pub trait Mat4Ext {
    /// Translation in the XY plane
    fn translation_2d(offset: Vec2) -> Mat4;

    /// Non-uniform scale in the XY plane (Z untouched)
    fn scale_2d(scale: Vec2) -> Mat4;

    /// Rotation around the Z axis, angle in degrees
    fn rotation_z_degrees(degrees: f32) -> Mat4;

    /// Local 2D transform: `translate(position) * rotate_z(angle) * scale(scale)`
    fn transform_2d(position: Vec2, angle_degrees: f32, scale: Vec2) -> Mat4;

    /// Local 3D transform: `translate(position) * rotate(rotation) * scale(scale)`
    fn transform_3d(position: Vec3, rotation: &Quat, scale: Vec3) -> Mat4;

    /// Left-handed perspective projection with depth mapped to `[0, 1]`
    fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Left-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Inverse, falling back to identity for singular matrices
    fn inverse_or_identity(&self) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn translation_2d(offset: Vec2) -> Mat4 {
        Mat4::new_translation(&Vec3::new(offset.x, offset.y, 0.0))
    }

    fn scale_2d(scale: Vec2) -> Mat4 {
        Mat4::new_nonuniform_scaling(&Vec3::new(scale.x, scale.y, 1.0))
    }

    fn rotation_z_degrees(degrees: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), utils::deg_to_rad(degrees))
    }

    fn transform_2d(position: Vec2, angle_degrees: f32, scale: Vec2) -> Mat4 {
        Self::translation_2d(position) * Self::rotation_z_degrees(angle_degrees) * Self::scale_2d(scale)
    }

    fn transform_3d(position: Vec3, rotation: &Quat, scale: Vec3) -> Mat4 {
        Mat4::new_translation(&position) * rotation.to_homogeneous() * Mat4::new_nonuniform_scaling(&scale)
    }

    fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        // P = [1/(a*tan(f/2))  0            0          0         ]
        //     [0               1/tan(f/2)   0          0         ]
        //     [0               0            f/(f-n)   -nf/(f-n)  ]
        //     [0               0            1          0         ]
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;
        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = up.cross(&forward).normalize();
        let camera_up = forward.cross(&right);

        Mat4::new(
            right.x, right.y, right.z, -right.dot(&eye),
            camera_up.x, camera_up.y, camera_up.z, -camera_up.dot(&eye),
            forward.x, forward.y, forward.z, -forward.dot(&eye),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn inverse_or_identity(&self) -> Mat4 {
        self.try_inverse().unwrap_or_else(Mat4::identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_2d_order_is_translate_rotate_scale() {
        let m = Mat4::transform_2d(Vec2::new(10.0, 0.0), 90.0, Vec2::new(2.0, 2.0));
        let p = m.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));

        // scale to (2,0), rotate to (0,2), translate to (10,2)
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_matches_inverse_of_camera_pose() {
        let eye = Vec3::new(0.0, 0.0, -5.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::y());
        let pose = Mat4::new_translation(&eye);

        assert_relative_eq!(view, pose.inverse_or_identity(), epsilon = 1e-5);
    }

    #[test]
    fn test_inverse_or_identity_on_singular_matrix() {
        assert_eq!(Mat4::zeros().inverse_or_identity(), Mat4::identity());
    }
}
