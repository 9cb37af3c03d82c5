use std::process::{Command, Stdio};

use crate::error::{OrchestratorError, Result};

/// Verify that the container daemon is reachable and return its version.
pub fn ensure_available(program: &str) -> Result<String> {
    let output = Command::new(program)
        .args(["version", "--format", "{{.Server.Version}}"])
        .stdin(Stdio::null())
        .output()
        .map_err(|source| OrchestratorError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(OrchestratorError::InvocationFailure {
            operation: "docker version",
            exit_code: output.status.code(),
            cancelled: false,
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
