pub mod commands;
mod operations;
mod paths;
mod types;

pub use operations::ContainerOrchestrator;
pub use paths::{forward_slashes, mount_path};
pub use types::{
    CONTAINER_DATA_DIR, CONTAINER_SCRIPT_PATH, CONTAINER_SHELL, ImageReference, PlatformHint,
    platform_args,
};
