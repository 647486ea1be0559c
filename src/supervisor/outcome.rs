//! Run outcome and exit-code mapping.

use crate::cli::{EventAccumulator, SpawnError, UsageError};
use crate::config::ConfigError;

/// Exit code for a clean run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for usage errors, missing output and other generic failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the timeout elapsed.
pub const EXIT_TIMEOUT: i32 = 124;
/// Exit code when the Codex executable could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code when this process was interrupted.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Fatal conditions of a run. Each maps to a stable exit code.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// Codex exited 0 without emitting an agent message.
    #[error("Codex completed without agent_message output")]
    MissingMessage,

    /// Codex exited non-zero.
    #[error("Codex exited with status {code}")]
    ChildFailed { code: i32 },

    #[error("Codex execution timeout after {secs}s")]
    Timeout { secs: u64 },

    #[error("Interrupted, Codex process terminated")]
    Interrupted,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn(SpawnError::NotFound(_)) => EXIT_NOT_FOUND,
            Self::ChildFailed { code } => *code,
            Self::Timeout { .. } => EXIT_TIMEOUT,
            Self::Interrupted => EXIT_INTERRUPTED,
            Self::Usage(_)
            | Self::Config(_)
            | Self::Spawn(_)
            | Self::MissingMessage
            | Self::Io(_) => EXIT_FAILURE,
        }
    }
}

/// Whether a run succeeded.
#[derive(Debug)]
pub enum RunStatus {
    /// Clean exit with a captured agent message.
    Success { message: String },
    Failure(RunError),
}

/// Final result of a supervised run.
#[derive(Debug)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub session_id: Option<String>,
    pub last_message: Option<String>,
}

impl RunOutcome {
    /// Outcome of a child that exited cleanly.
    ///
    /// Succeeds only if an agent message was captured.
    #[must_use]
    pub fn completed(acc: EventAccumulator) -> Self {
        let (session_id, last_message) = acc.into_parts();
        let status = match &last_message {
            Some(message) => RunStatus::Success {
                message: message.clone(),
            },
            None => RunStatus::Failure(RunError::MissingMessage),
        };
        Self {
            status,
            session_id,
            last_message,
        }
    }

    /// Failed run; whatever was captured before the failure is kept.
    #[must_use]
    pub fn failure(error: impl Into<RunError>, acc: EventAccumulator) -> Self {
        let (session_id, last_message) = acc.into_parts();
        Self {
            status: RunStatus::Failure(error.into()),
            session_id,
            last_message,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Success { .. })
    }

    /// The error, if the run failed.
    #[must_use]
    pub fn error(&self) -> Option<&RunError> {
        match &self.status {
            RunStatus::Success { .. } => None,
            RunStatus::Failure(e) => Some(e),
        }
    }

    /// Process exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.error().map_or(EXIT_SUCCESS, RunError::exit_code)
    }
}
