//! Codex command-line construction.

use crate::cli::{InvocationDescriptor, Mode};
use crate::display;

/// Argument telling `codex` to read the task from stdin.
pub const STDIN_PLACEHOLDER: &str = "-";

/// How the task text reaches the child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Task passed as a trailing argv literal.
    Inline,
    /// Task written to the child's stdin, argv carries [`STDIN_PLACEHOLDER`].
    Piped,
}

impl DeliveryMode {
    /// Pick the delivery mode for `task`.
    ///
    /// Length is counted in characters, not bytes. A task of exactly
    /// `threshold` characters is still passed inline.
    #[must_use]
    pub fn for_task(task: &str, threshold: usize) -> Self {
        if task.chars().count() > threshold {
            Self::Piped
        } else {
            Self::Inline
        }
    }

    /// Like [`DeliveryMode::for_task`], warning the user when stdin is chosen.
    #[must_use]
    pub fn select(task: &str, threshold: usize) -> Self {
        let mode = Self::for_task(task, threshold);
        if mode == Self::Piped {
            display::print_warning(&format!(
                "Task length ({} chars) exceeds threshold, using stdin mode to avoid shell escaping issues",
                task.chars().count()
            ));
        }
        mode
    }

    /// Returns true if the task must be written to stdin.
    #[must_use]
    pub fn is_piped(self) -> bool {
        self == Self::Piped
    }
}

/// Build the arguments for `codex` (excluding the program name).
///
/// This is a pure function of its inputs.
#[must_use]
pub fn build_args(desc: &InvocationDescriptor, delivery: DeliveryMode) -> Vec<String> {
    let task = match delivery {
        DeliveryMode::Inline => desc.task.clone(),
        DeliveryMode::Piped => STDIN_PLACEHOLDER.to_string(),
    };

    match &desc.mode {
        Mode::Resume { session_id } => vec![
            "e".to_string(),
            "--skip-git-repo-check".to_string(),
            "--json".to_string(),
            "resume".to_string(),
            session_id.clone(),
            task,
        ],
        Mode::New => vec![
            "e".to_string(),
            "-m".to_string(),
            desc.model.clone(),
            "--dangerously-bypass-approvals-and-sandbox".to_string(),
            "--skip-git-repo-check".to_string(),
            "-C".to_string(),
            desc.workdir.clone(),
            "--json".to_string(),
            task,
        ],
    }
}
