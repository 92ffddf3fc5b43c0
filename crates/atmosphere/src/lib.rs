//! Ambient weather visualizer.
//!
//! Picks a rendering mode from an analysis result and runs a procedural
//! particle world for it: snow, leaves, rain, wind streaks, fog, sun rays and
//! lightning. Hosts drive it through [`WorldController`], feed events through
//! [`input::InputPort`] and draw with any [`engine_core::DrawSurface`].

pub mod controller;
pub mod error;
pub mod inputs;
pub mod lightning;
pub mod mode;
pub mod particles;
pub mod world;

pub use controller::*;
pub use error::*;
pub use inputs::*;
pub use lightning::*;
pub use mode::*;
pub use particles::*;
pub use world::*;
