use std::fmt;

use crate::error::{OrchestratorError, Result};

/// Container path the host dataset directory is bound to.
pub const CONTAINER_DATA_DIR: &str = "/data";
/// Container path the host script is bound to.
pub const CONTAINER_SCRIPT_PATH: &str = "/scripts/run_reconall.sh";
/// Shell used to execute the mounted script inside the container.
pub const CONTAINER_SHELL: &str = "/bin/bash";

/// A validated container image reference (`repo/name[:tag]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference(String);

impl ImageReference {
    /// Accepts any non-blank reference that cannot be mistaken for a flag
    /// or split into several arguments. Registry, name and tag are opaque.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "image reference must not be empty".into(),
            ));
        }
        if trimmed.starts_with('-') {
            return Err(OrchestratorError::InvalidInput(format!(
                "image reference `{trimmed}` looks like a flag"
            )));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(OrchestratorError::InvalidInput(format!(
                "image reference `{trimmed}` contains whitespace"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects which architecture the runtime should pull or emulate.
///
/// The labels are historical and do not describe the host: `mac` requests
/// the native arm64 variant, `windows` forces amd64 emulation (which is
/// what Apple Silicon hosts need when arm64 binaries are missing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformHint {
    Mac,
    Windows,
}

impl PlatformHint {
    /// Exactly `mac` and `windows` map to a hint; every other label,
    /// including other casings, means "let the runtime decide".
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "mac" => Some(Self::Mac),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    pub fn emulation_platform(self) -> &'static str {
        match self {
            Self::Mac => "linux/arm64",
            Self::Windows => "linux/amd64",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }
}

/// `["--platform", <arch>]` for a hint, empty otherwise.
pub fn platform_args(hint: Option<PlatformHint>) -> Vec<String> {
    match hint {
        Some(h) => vec!["--platform".into(), h.emulation_platform().into()],
        None => Vec::new(),
    }
}
