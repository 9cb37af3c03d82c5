//! Build, pull, and run the FreeSurfer surface-based morphometry image.
//!
//! Every operation is a single blocking invocation of the container
//! runtime; failures come back as [`OrchestratorError`] so callers choose
//! their own policy.

pub mod config;
pub mod docker;
pub mod error;
pub mod orchestrator;

pub use config::Config;
pub use error::OrchestratorError;
pub use orchestrator::{ContainerOrchestrator, ImageReference, PlatformHint};
