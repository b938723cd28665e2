//! # Engine Configuration
//!
//! Configuration for the scene engine, grouped by subsystem:
//!
//! - **Logging**: level and per-module filters handed to `env_logger`
//! - **Graphics**: clear color and the implicit default 3D camera
//! - **Debug**: developer overlays such as the transform visualization pass
//!
//! Every section has defaults, so a partial TOML/RON file is valid.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};
use crate::render::Color;

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level ("error", "warn", "info", "debug", "trace", "off")
    pub level: String,
    /// Optional `env_logger` filter directives, e.g. "scene_engine::render=trace"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
}

impl LoggingConfig {
    /// Parsed level, `Info` if the string is not a level name
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Builder pattern: set level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filters: None,
        }
    }
}

/// # Default 3D Camera
///
/// Parameters of the camera used when no explicit 3D camera is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultCamera3DConfig {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Eye position; the camera looks at the origin with +Y up
    pub eye: [f32; 3],
}

impl Default for DefaultCamera3DConfig {
    fn default() -> Self {
        Self {
            fov_y: 1.05,
            near: 0.1,
            far: 5000.0,
            eye: [0.0, 0.0, -5.0],
        }
    }
}

/// # Graphics Configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Clear color of the screen and of both default cameras
    pub clear_color: Color,
    /// Implicit default 3D camera
    pub default_camera_3d: DefaultCamera3DConfig,
}

/// # Debug Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Emit a transform-visualization overlay for every drawn transform node
    pub visible_transform_info: bool,
}

/// # Engine Configuration
///
/// Top-level configuration handed to [`crate::Engine::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logging setup
    pub logging: LoggingConfig,
    /// Graphics defaults
    pub graphics: GraphicsConfig,
    /// Debug features
    pub debug: DebugConfig,
}

impl EngineConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging = self.logging.with_level(level);
        self
    }

    /// Builder pattern: set clear color
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.graphics.clear_color = color;
        self
    }

    /// Builder pattern: toggle the transform visualization pass
    pub fn with_visible_transform_info(mut self, enabled: bool) -> Self {
        self.debug.visible_transform_info = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.logging.level)));
        }

        let camera = &self.graphics.default_camera_3d;
        if !(camera.fov_y > 0.0 && camera.fov_y < std::f32::consts::PI) {
            return Err(ConfigError::Invalid(format!("default camera fov_y {} out of (0, pi)", camera.fov_y)));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(ConfigError::Invalid(format!(
                "default camera clipping range [{}, {}] is empty",
                camera.near, camera.far
            )));
        }

        Ok(())
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
        assert!(!config.debug.visible_transform_info);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [debug]
            visible_transform_info = true

            [graphics.clear_color]
            r = 10
            g = 20
            b = 30
            a = 255
            "#,
        )
        .unwrap();

        assert!(config.debug.visible_transform_info);
        assert_eq!(config.graphics.clear_color, Color::new(10, 20, 30, 255));
        assert_eq!(config.graphics.default_camera_3d, DefaultCamera3DConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EngineConfig::new()
            .with_log_level("debug")
            .with_visible_transform_info(true);

        let text = config.to_string_as(ConfigFormat::Ron).unwrap();
        let parsed = EngineConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = EngineConfig::new().with_log_level("loud");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.logging.level = "warn".to_string();
        config.graphics.default_camera_3d.far = 0.05;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_file_round_trip_and_unknown_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("scene_engine_config_{}.toml", std::process::id()));

        let config = EngineConfig::new().with_clear_color(Color::new(1, 2, 3, 4));
        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);

        let err = EngineConfig::load_from_file(dir.join("engine.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
