//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and matrix builders
//! - Arena handles and bitmask helpers
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
