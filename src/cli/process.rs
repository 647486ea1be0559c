//! Codex process spawning and control.
//!
//! [`CodexProcess`] owns the child handle for one run. Termination goes
//! through [`CodexProcess::graceful_terminate`], which runs its
//! SIGTERM / grace period / SIGKILL sequence at most once. The underlying
//! command is spawned with `kill_on_drop`, so dropping the handle on an
//! unexpected path still kills the child.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::cli::DeliveryMode;

/// Error type for process spawning operations.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    /// The binary was not found.
    #[error("{0} command not found in PATH")]
    NotFound(String),
    /// Permission denied when spawning.
    #[error("Permission denied executing {0}")]
    PermissionDenied(String),
    /// Other I/O error.
    #[error("Failed to spawn {binary}: {source}")]
    Io {
        binary: String,
        source: std::io::Error,
    },
}

impl SpawnError {
    /// Create a `SpawnError` from an I/O error, classifying common cases.
    fn from_io(binary: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(binary.to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(binary.to_string()),
            _ => Self::Io {
                binary: binary.to_string(),
                source: err,
            },
        }
    }
}

/// How a termination request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process had already exited, or was terminated before.
    AlreadyDone,
    /// The process exited within the grace period after SIGTERM.
    Graceful,
    /// The grace period elapsed and SIGKILL was sent.
    Killed,
}

/// A running Codex process.
#[derive(Debug)]
pub struct CodexProcess {
    child: Child,
    terminated: bool,
}

impl CodexProcess {
    /// Spawn `binary` with `args`.
    ///
    /// Stderr is inherited. Stdout is piped. Stdin is piped only for
    /// [`DeliveryMode::Piped`].
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the process fails to spawn.
    pub fn spawn(binary: &str, args: &[String], delivery: DeliveryMode) -> Result<Self, SpawnError> {
        let stdin = if delivery.is_piped() {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let child = Command::new(binary)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpawnError::from_io(binary, e))?;

        tracing::info!(binary, pid = ?child.id(), ?delivery, "Spawned Codex process");

        Ok(Self {
            child,
            terminated: false,
        })
    }

    /// Take ownership of the stdin handle.
    ///
    /// Returns `None` for [`DeliveryMode::Inline`] or once already taken.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// Take ownership of the stdout handle.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Get the process ID, if still running.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Check if the process has exited without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the process state cannot be queried.
    pub fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Wait for the process to exit.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting fails.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Returns true once a termination sequence has run.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Attempt graceful termination with a timeout.
    ///
    /// On Unix, sends SIGTERM first, then SIGKILL after the timeout.
    /// On other platforms, falls back to immediate kill. Calling this again
    /// after a previous call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if termination fails.
    pub async fn graceful_terminate(&mut self, timeout: Duration) -> std::io::Result<Termination> {
        if self.terminated {
            return Ok(Termination::AlreadyDone);
        }
        self.terminated = true;

        if self.child.try_wait()?.is_some() {
            return Ok(Termination::AlreadyDone);
        }

        #[cfg(unix)]
        {
            self.graceful_terminate_unix(timeout).await
        }

        #[cfg(not(unix))]
        {
            let _ = timeout;
            self.child.kill().await?;
            Ok(Termination::Killed)
        }
    }

    #[cfg(unix)]
    async fn graceful_terminate_unix(&mut self, timeout: Duration) -> std::io::Result<Termination> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.id() else {
            return Ok(Termination::AlreadyDone);
        };

        let nix_pid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));
        if let Err(e) = kill(nix_pid, Signal::SIGTERM) {
            tracing::debug!(pid, error = %e, "SIGTERM failed");
        } else {
            tracing::info!(pid, grace = ?timeout, "Sent SIGTERM to Codex process");
        }

        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(pid, ?status, "Codex process exited after SIGTERM");
                Ok(Termination::Graceful)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::info!(pid, "Grace period elapsed, sending SIGKILL");
                self.child.kill().await?;
                Ok(Termination::Killed)
            }
        }
    }
}

/// Write the whole task to `stdin`, then close it.
///
/// # Errors
///
/// Returns an error if the write fails, e.g. because the child already
/// closed its input.
pub async fn write_task(mut stdin: ChildStdin, task: &str) -> std::io::Result<()> {
    stdin.write_all(task.as_bytes()).await?;
    stdin.shutdown().await?;
    tracing::debug!(bytes = task.len(), "Wrote task to stdin");
    Ok(())
}

/// Exit code to report for a finished child.
///
/// A child killed by a signal has no code and is reported as `128 + signal`,
/// following shell convention.
#[must_use]
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
