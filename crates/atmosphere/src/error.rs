//! Setup failures. The controller logs these and stays inert; none of them
//! reach the host as a hard error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("no rendering surface attached")]
    MissingSurface,
    #[error("viewport {width}x{height} has no drawable area")]
    EmptyViewport { width: f32, height: f32 },
}
