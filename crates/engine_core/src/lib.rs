//! Core types shared by the backdrop crates.
//!
//! This crate provides the foundational types used across all systems:
//! - Frame timing and the integer frame clock
//! - Viewport dimensions in logical pixels
//! - The drawing surface abstraction that renderers implement

pub mod surface;
pub mod time;
pub mod viewport;

pub use surface::*;
pub use time::*;
pub use viewport::*;

// Re-export commonly used types
pub use glam::Vec2;
