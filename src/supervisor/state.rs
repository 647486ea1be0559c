//! Run state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single Codex run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    #[default]
    Idle,
    Spawned,
    Running,
    Completed,
    TimedOut,
    SpawnFailed,
    Interrupted,
}

impl RunState {
    /// Returns true for states a run never leaves.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::TimedOut | Self::SpawnFailed | Self::Interrupted
        )
    }
}

/// State machine for tracking run progress.
#[derive(Debug, Clone, Default)]
pub struct RunStateMachine {
    state: RunState,
}

impl RunStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Move to `new_state`. Transitions out of a terminal state are ignored.
    pub fn transition(&mut self, new_state: RunState) {
        if self.state.is_terminal() {
            tracing::debug!(from = ?self.state, to = ?new_state, "Ignoring transition from terminal state");
            return;
        }
        tracing::debug!(from = ?self.state, to = ?new_state, "State transition");
        self.state = new_state;
    }
}
