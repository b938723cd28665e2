//! Camera capability of scene nodes

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::{ClearFlags, Color, RenderPassParameter, RenderTexture, RenderedCamera, TextureSize};

use super::Dimension;

/// How a camera maps its view space to clip space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Pixel-space 2D camera, no projection beyond the view
    Orthographic,
    /// Left-handed perspective projection
    Perspective {
        /// Vertical field of view in radians, same unit as the default camera config
        fov_y: f32,
        /// Near clipping distance
        near: f32,
        /// Far clipping distance
        far: f32,
    },
}

impl Projection {
    /// Perspective with a 60° (pi/3) field of view, clipping at 0.1 and 100
    pub const DEFAULT_PERSPECTIVE: Projection = Projection::Perspective {
        fov_y: std::f32::consts::FRAC_PI_3,
        near: 0.1,
        far: 100.0,
    };
}

/// Camera capability: group mask, target and pass parameters
#[derive(Debug, Clone)]
pub struct Camera {
    pub(crate) group: u64,
    projection: Projection,
    rendered: RenderedCamera,
}

impl Camera {
    /// 2D camera rendering to the screen
    pub fn new_2d() -> Self {
        Self::new(Dimension::TwoD, Projection::Orthographic)
    }

    /// 3D camera with the default perspective, rendering to the screen
    pub fn new_3d() -> Self {
        Self::new(Dimension::ThreeD, Projection::DEFAULT_PERSPECTIVE)
    }

    fn new(dimension: Dimension, projection: Projection) -> Self {
        let mut rendered = RenderedCamera::new(dimension);
        rendered.render_pass = RenderPassParameter::new(Color::default(), ClearFlags::DEPTH);
        Self {
            group: 0,
            projection,
            rendered,
        }
    }

    /// Builder: render into `texture` instead of the screen
    pub fn with_target_texture(mut self, texture: RenderTexture) -> Self {
        self.rendered.target_texture = Some(texture);
        self
    }

    /// Builder: clear the color attachment with `color` at the start of each pass
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.set_clear_color(color);
        self.set_color_cleared(true);
        self
    }

    /// Camera-group mask; change it through the engine so the registry follows
    pub fn group(&self) -> u64 {
        self.group
    }

    /// 2D or 3D
    pub fn dimension(&self) -> Dimension {
        self.rendered.dimension
    }

    /// Projection parameters
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Replace the projection parameters
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    /// Render target, `None` for the screen
    pub fn target_texture(&self) -> Option<RenderTexture> {
        self.rendered.target_texture
    }

    /// Render into `texture`, or the screen with `None`
    pub fn set_target_texture(&mut self, texture: Option<RenderTexture>) {
        self.rendered.target_texture = texture;
    }

    /// Clear color of the pass
    pub fn clear_color(&self) -> Color {
        self.rendered.render_pass.clear_color
    }

    /// Set the clear color of the pass
    pub fn set_clear_color(&mut self, color: Color) {
        self.rendered.render_pass.clear_color = color;
    }

    /// True when the pass clears its color attachment
    pub fn is_color_cleared(&self) -> bool {
        self.rendered.render_pass.clear.contains(ClearFlags::COLOR)
    }

    /// Toggle clearing of the color attachment
    pub fn set_color_cleared(&mut self, cleared: bool) {
        self.rendered.render_pass.clear.set(ClearFlags::COLOR, cleared);
    }

    /// Camera state handed to the graphics layer, as of the last refresh
    pub fn rendered(&self) -> &RenderedCamera {
        &self.rendered
    }

    /// Size of the surface this camera renders into
    pub fn target_size(&self, screen: TextureSize) -> TextureSize {
        self.rendered.target_texture.map_or(screen, |texture| texture.size)
    }

    /// Recompute the view from the camera node's world matrix
    pub(crate) fn refresh_view(&mut self, absolute: &Mat4, screen: TextureSize) {
        let view = absolute.inverse_or_identity();
        self.rendered.view = match self.projection {
            Projection::Orthographic => view,
            Projection::Perspective { fov_y, near, far } => {
                let aspect = self.target_size(screen).aspect();
                Mat4::perspective_fov_lh(fov_y, aspect, near, far) * view
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec2, Vec3};
    use crate::core::config::DefaultCamera3DConfig;
    use crate::render::{TextureFormat, TextureId};
    use approx::assert_relative_eq;

    #[test]
    fn test_2d_view_is_inverse_of_world() {
        let mut camera = Camera::new_2d();
        let world = Mat4::translation_2d(Vec2::new(100.0, 50.0));
        camera.refresh_view(&world, TextureSize::new(640, 480));

        let p = camera.rendered().view.transform_point(&nalgebra::Point3::new(100.0, 50.0, 0.0));
        assert_relative_eq!(p.coords, Vec3::zeros(), epsilon = 1e-5);
    }

    #[test]
    fn test_perspective_uses_target_aspect() {
        let target = RenderTexture {
            id: TextureId(3),
            size: TextureSize::new(200, 100),
            format: TextureFormat::Rgba8,
        };
        let mut camera = Camera::new_3d().with_target_texture(target);
        camera.refresh_view(&Mat4::identity(), TextureSize::new(640, 640));

        let expected = Mat4::perspective_fov_lh(std::f32::consts::FRAC_PI_3, 2.0, 0.1, 100.0);
        assert_relative_eq!(camera.rendered().view, expected, epsilon = 1e-5);
        assert_eq!(camera.target_size(TextureSize::new(640, 640)), TextureSize::new(200, 100));
    }

    #[test]
    fn test_fov_matches_default_camera_config_unit() {
        let config = DefaultCamera3DConfig::default();
        let mut camera = Camera::new_3d();
        camera.set_projection(Projection::Perspective {
            fov_y: config.fov_y,
            near: config.near,
            far: config.far,
        });
        camera.refresh_view(&Mat4::identity(), TextureSize::new(300, 300));

        let expected = Mat4::perspective_fov_lh(config.fov_y, 1.0, config.near, config.far);
        assert_relative_eq!(camera.rendered().view, expected, epsilon = 1e-5);
        assert_relative_eq!(camera.rendered().view[(1, 1)], 1.0 / (config.fov_y * 0.5).tan(), epsilon = 1e-5);

        let mut quarter = Camera::new_3d();
        quarter.set_projection(Projection::Perspective { fov_y: std::f32::consts::FRAC_PI_2, near: 1.0, far: 10.0 });
        quarter.refresh_view(&Mat4::identity(), TextureSize::new(64, 64));
        assert_relative_eq!(quarter.rendered().view[(1, 1)], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_clear_flags() {
        let camera = Camera::new_2d();
        assert!(!camera.is_color_cleared());
        assert!(camera.rendered().render_pass.clear.contains(ClearFlags::DEPTH));

        let camera = camera.with_clear_color(Color::new(1, 2, 3, 255));
        assert!(camera.is_color_cleared());
        assert_eq!(camera.clear_color(), Color::new(1, 2, 3, 255));
    }
}
