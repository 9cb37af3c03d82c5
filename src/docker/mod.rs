// Container runtime access: daemon probe, blocking execution with output capture, cancellation.

pub mod engine;
pub mod run;
pub mod types;

pub use engine::ensure_available;
pub use run::{DockerExecutor, Executor, execute};
pub use types::{CancelToken, ContainerCommand, ContainerResult};
