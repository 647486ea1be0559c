//! Positional invocation parsing.
//!
//! Turns the raw positional arguments into an [`InvocationDescriptor`]:
//!
//! ```text
//! <task> [model] [workdir]
//! resume <session_id> <task> [model] [workdir]
//! ```

use crate::config::RunnerConfig;

/// Positional sentinel selecting resume mode.
pub const RESUME_SENTINEL: &str = "resume";

/// Error for a malformed invocation. Always fatal, raised before spawning.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// No positional arguments at all.
    #[error("Task required")]
    MissingTask,
    /// `resume` without both a session id and a task.
    #[error("Resume mode requires: resume <session_id> <task>")]
    IncompleteResume,
}

/// Whether the run starts a new Codex thread or continues an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    New,
    Resume { session_id: String },
}

/// Normalized description of a single Codex invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationDescriptor {
    pub mode: Mode,
    pub task: String,
    pub model: String,
    pub workdir: String,
}

impl InvocationDescriptor {
    /// Parse positional arguments, filling defaults from `config`.
    ///
    /// # Errors
    ///
    /// Returns `UsageError` if the task (or, in resume mode, the session id)
    /// is missing.
    pub fn from_positionals<S: AsRef<str>>(
        args: &[S],
        config: &RunnerConfig,
    ) -> Result<Self, UsageError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        let (mode, rest) = match args.as_slice() {
            [] => return Err(UsageError::MissingTask),
            [RESUME_SENTINEL, session_id, rest @ ..] if !rest.is_empty() => (
                Mode::Resume {
                    session_id: (*session_id).to_string(),
                },
                rest,
            ),
            [RESUME_SENTINEL, ..] => return Err(UsageError::IncompleteResume),
            rest => (Mode::New, rest),
        };

        let task = rest[0].to_string();
        let model = rest
            .get(1)
            .map_or_else(|| config.default_model.clone(), |s| (*s).to_string());
        let workdir = rest
            .get(2)
            .map_or_else(|| config.default_workdir.clone(), |s| (*s).to_string());

        Ok(Self {
            mode,
            task,
            model,
            workdir,
        })
    }

    /// Session id being resumed, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        match &self.mode {
            Mode::New => None,
            Mode::Resume { session_id } => Some(session_id),
        }
    }

    /// Returns true in resume mode.
    #[must_use]
    pub fn is_resume(&self) -> bool {
        matches!(self.mode, Mode::Resume { .. })
    }
}
