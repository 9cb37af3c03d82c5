mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, load, load_file};
pub use types::{Config, DEFAULT_BUILD_PLATFORMS, DEFAULT_DOCKERFILE, DEFAULT_IMAGE};
