//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Model passed to `codex` when the invocation does not name one.
pub const DEFAULT_MODEL: &str = "gpt-5.1-codex";

/// Working directory passed to `codex` when the invocation does not name one.
pub const DEFAULT_WORKDIR: &str = ".";

/// Hard execution timeout, in seconds, when no override is given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 7200;

/// Seconds to wait after SIGTERM before sending SIGKILL.
pub const DEFAULT_TERMINATE_GRACE_SECS: u64 = 5;

/// Tasks longer than this many characters are written to stdin instead of argv.
pub const DEFAULT_STDIN_THRESHOLD: usize = 800;

/// Runner configuration, loaded from TOML.
///
/// Every field has a default, so an empty file (or no file at all) yields
/// the stock behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Name or path of the Codex executable.
    pub binary: String,
    /// Model used when none is given on the command line.
    pub default_model: String,
    /// Working directory used when none is given on the command line.
    pub default_workdir: String,
    /// Character count above which the task is piped through stdin.
    pub stdin_threshold: usize,
    /// Timeout used when `CODEX_TIMEOUT` is unset or invalid.
    pub default_timeout_secs: u64,
    /// Grace period between SIGTERM and SIGKILL.
    pub terminate_grace_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            binary: "codex".to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_workdir: DEFAULT_WORKDIR.to_string(),
            stdin_threshold: DEFAULT_STDIN_THRESHOLD,
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            terminate_grace_secs: DEFAULT_TERMINATE_GRACE_SECS,
        }
    }
}

impl RunnerConfig {
    /// Grace period as a `Duration`.
    #[must_use]
    pub fn terminate_grace(&self) -> Duration {
        Duration::from_secs(self.terminate_grace_secs)
    }
}
