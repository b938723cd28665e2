//! Scene scenario tests
//!
//! Whole-frame behavior through [`crate::Engine`] and the recording
//! [`crate::render::HeadlessGraphics`].

mod index_consistency;
