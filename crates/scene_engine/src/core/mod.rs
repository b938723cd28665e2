//! # Core Engine Module
//!
//! Shared configuration types used by every subsystem of the scene engine.

pub mod config;

pub use config::{
    Config,
    ConfigError,
    ConfigFormat,
    DebugConfig,
    DefaultCamera3DConfig,
    EngineConfig,
    GraphicsConfig,
    LoggingConfig,
};
