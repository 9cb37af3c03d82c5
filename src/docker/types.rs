use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation token backed by an `AtomicBool`.
///
/// A running invocation observes the token between polls and kills the
/// child process once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One invocation of the container runtime. `args` excludes the runtime
/// binary itself; the executor supplies that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerCommand {
    /// Short label used in logs and diagnostics, e.g. `docker pull`.
    pub operation: &'static str,
    pub args: Vec<String>,
    /// When set, the captured output is written here after the process exits.
    pub log_path: Option<PathBuf>,
}

impl ContainerCommand {
    pub fn new(operation: &'static str, args: Vec<String>) -> Self {
        Self {
            operation,
            args,
            log_path: None,
        }
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Render as a single shell-quoted line for display.
    pub fn command_line(&self, program: &str) -> String {
        shell_words::join(std::iter::once(program).chain(self.args.iter().map(String::as_str)))
    }
}

/// Outcome of a finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerResult {
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr, in arrival order.
    pub log: String,
    pub stderr: String,
    pub cancelled: bool,
}

impl ContainerResult {
    pub fn success(&self) -> bool {
        !self.cancelled && self.exit_code == Some(0)
    }

    /// Last non-blank stderr line, which is where the runtime reports why
    /// it gave up.
    pub fn failure_detail(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}
