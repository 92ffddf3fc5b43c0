//! wgpu canvas the backdrop draws into.

pub mod pipeline;
pub mod renderer;
pub mod vertex;

pub use pipeline::*;
pub use renderer::*;
pub use vertex::*;
