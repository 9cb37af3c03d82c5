use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use super::types::{CancelToken, ContainerCommand, ContainerResult};
use crate::error::{OrchestratorError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Runs a [`ContainerCommand`] to completion.
///
/// Implementations block the calling thread until the invocation is over.
pub trait Executor {
    /// Name of the runtime binary, used when rendering command lines.
    fn program(&self) -> &str;

    fn execute(&self, cmd: &ContainerCommand) -> Result<ContainerResult>;
}

/// Executes commands with the real container runtime binary.
#[derive(Debug, Clone)]
pub struct DockerExecutor {
    program: String,
    cancel: CancelToken,
}

impl DockerExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cancel: CancelToken::new(),
        }
    }

    /// Kill the running child when `cancel` is signalled.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Executor for DockerExecutor {
    fn program(&self) -> &str {
        &self.program
    }

    fn execute(&self, cmd: &ContainerCommand) -> Result<ContainerResult> {
        execute(&self.program, cmd, &self.cancel)
    }
}

/// Spawn `program` with the command's arguments and block until it exits.
///
/// Output lines are echoed to this process's stdout/stderr as they arrive
/// and collected into the returned [`ContainerResult`].
pub fn execute(
    program: &str,
    cmd: &ContainerCommand,
    cancel: &CancelToken,
) -> Result<ContainerResult> {
    debug!(command = %cmd.command_line(program), "spawning");

    let spawn_error = |source| OrchestratorError::Spawn {
        program: program.to_string(),
        source,
    };

    let mut child = Command::new(program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = child.kill();
        let _ = child.wait();
        return Err(spawn_error(std::io::Error::other("child output was not captured")));
    };

    // Combined output, in arrival order.
    let log_buf = Arc::new(Mutex::new(String::new()));

    let stdout_handle = forward(stdout, log_buf.clone(), None, Stream::Stdout);
    let stderr_buf = Arc::new(Mutex::new(String::new()));
    let stderr_handle = forward(stderr, log_buf.clone(), Some(stderr_buf.clone()), Stream::Stderr);

    let (exit_code, cancelled) = wait(&mut child, cancel);

    let _ = stdout_handle.join();
    let _ = stderr_handle.join();

    let log = log_buf.lock().map(|b| b.clone()).unwrap_or_default();
    let stderr = stderr_buf.lock().map(|b| b.clone()).unwrap_or_default();

    if let Some(path) = &cmd.log_path
        && let Err(e) = std::fs::write(path, &log)
    {
        tracing::warn!(path = %path.display(), error = %e, "failed to write log file");
    }

    Ok(ContainerResult {
        exit_code,
        log,
        stderr,
        cancelled,
    })
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn forward<R: Read + Send + 'static>(
    source: R,
    log_buf: Arc<Mutex<String>>,
    own_buf: Option<Arc<Mutex<String>>>,
    stream: Stream,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut raw = Vec::new();
        // Drain to EOF even when a line is not UTF-8; a closed read end
        // would kill the runtime with SIGPIPE.
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            if raw.last() == Some(&b'\n') {
                raw.pop();
            }
            let line = String::from_utf8_lossy(&raw);
            if let Ok(mut buf) = log_buf.lock() {
                buf.push_str(&line);
                buf.push('\n');
            }
            if let Some(own) = &own_buf
                && let Ok(mut buf) = own.lock()
            {
                buf.push_str(&line);
                buf.push('\n');
            }
            // The terminal may be gone; the log still has the line.
            let _ = match stream {
                Stream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
                Stream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
            };
        }
    })
}

/// The parts of [`Child`] the poll loop needs.
trait Reap {
    fn try_wait(&mut self) -> std::io::Result<Option<Option<i32>>>;
    fn kill_and_reap(&mut self);
}

impl Reap for Child {
    fn try_wait(&mut self) -> std::io::Result<Option<Option<i32>>> {
        Child::try_wait(self).map(|status| status.map(|s| s.code()))
    }

    fn kill_and_reap(&mut self) {
        let _ = self.kill();
        let _ = self.wait();
    }
}

/// Poll until the child exits or `cancel` fires. No timeout is applied.
///
/// The child is always gone on return, so the output pipes reach EOF.
fn wait(child: &mut impl Reap, cancel: &CancelToken) -> (Option<i32>, bool) {
    loop {
        match child.try_wait() {
            Ok(Some(code)) => return (code, false),
            Ok(None) => {}
            Err(_) => {
                child.kill_and_reap();
                return (None, false);
            }
        }

        if cancel.is_cancelled() {
            child.kill_and_reap();
            return (None, true);
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}
