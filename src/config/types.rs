use serde::{Deserialize, Serialize};

use crate::orchestrator::PlatformHint;

pub const DEFAULT_IMAGE: &str = "calvinwhow/freesurfer:latest";
pub const DEFAULT_BUILD_PLATFORMS: [&str; 2] = ["linux/amd64", "linux/arm64"];
pub const DEFAULT_DOCKERFILE: &str = "dockerfiles/Dockerfile.freesurfer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image used by `build` as its tag and by `pull`/`setup`/`run` when
    /// no image is given explicitly.
    pub image: String,
    pub build_platforms: Vec<String>,
    pub dockerfile: String,
    pub build_context: String,
    pub docker_binary: String,
    /// Default platform label (`mac` or `windows`). Any other value means
    /// the runtime's own default.
    pub platform: Option<String>,
}

impl Config {
    pub fn default_platform(&self) -> Option<PlatformHint> {
        self.platform.as_deref().and_then(PlatformHint::from_label)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            build_platforms: DEFAULT_BUILD_PLATFORMS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            dockerfile: DEFAULT_DOCKERFILE.to_string(),
            build_context: ".".to_string(),
            docker_binary: "docker".to_string(),
            platform: None,
        }
    }
}
