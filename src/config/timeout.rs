//! Timeout override resolution.
//!
//! `CODEX_TIMEOUT` is historically ambiguous: some callers set seconds, some
//! set milliseconds. Values above [`MILLIS_THRESHOLD`] are read as
//! milliseconds, everything else as seconds.

use std::time::Duration;

use crate::display;

/// Environment variable holding the timeout override.
pub const TIMEOUT_ENV_VAR: &str = "CODEX_TIMEOUT";

/// Overrides strictly above this are interpreted as milliseconds.
pub const MILLIS_THRESHOLD: u64 = 10_000;

/// Resolve the timeout in seconds from an optional override string.
///
/// An absent or empty override silently yields `default_secs`. A value that
/// is not an integer, or is not positive, logs a warning and also yields
/// `default_secs`.
#[must_use]
pub fn resolve_timeout_secs(raw: Option<&str>, default_secs: u64) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default_secs;
    };

    let secs = match raw.parse::<u128>() {
        Ok(0) | Err(_) => {
            display::print_warning(&format!(
                "Invalid {TIMEOUT_ENV_VAR} '{raw}', falling back to {default_secs}s"
            ));
            return default_secs;
        }
        Ok(value) if value > u128::from(MILLIS_THRESHOLD) => value / 1000,
        Ok(value) => value,
    };
    u64::try_from(secs).unwrap_or(u64::MAX)
}

/// Resolve the timeout from the `CODEX_TIMEOUT` environment variable.
#[must_use]
pub fn timeout_from_env(default_secs: u64) -> Duration {
    let raw = std::env::var(TIMEOUT_ENV_VAR).ok();
    let secs = resolve_timeout_secs(raw.as_deref(), default_secs);
    tracing::debug!(secs, raw = ?raw, "Resolved timeout");
    Duration::from_secs(secs)
}
