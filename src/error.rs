//! Error types for container orchestration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Rejected before any process was spawned.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The runtime binary could not be started at all.
    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The runtime ran but did not exit successfully.
    #[error("{operation} failed ({}){}", describe_exit(.exit_code, .cancelled), format_detail(.detail))]
    InvocationFailure {
        operation: &'static str,
        exit_code: Option<i32>,
        cancelled: bool,
        detail: String,
    },
}

impl OrchestratorError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::InvocationFailure { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn describe_exit(exit_code: &Option<i32>, cancelled: &bool) -> String {
    match (*cancelled, *exit_code) {
        (true, _) => "cancelled".to_string(),
        (false, Some(code)) => format!("exit status {code}"),
        (false, None) => "terminated by signal".to_string(),
    }
}

fn format_detail(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
