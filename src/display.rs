//! Result and diagnostic output.
//!
//! Stdout carries only the final agent message and session id. Every
//! diagnostic goes to stderr as a single line tagged `ERROR:` or `WARN:`.

use std::io::{self, Write};

use owo_colors::{OwoColorize, Stream, Style};

use crate::supervisor::{RunOutcome, RunStatus};

/// Separator between the agent message and the session id line.
pub const SESSION_SEPARATOR: &str = "---";

/// Format the success output.
///
/// ```text
/// <message>
///
/// ---
/// SESSION_ID: <id>
/// ```
///
/// The session block is omitted when no id was captured.
#[must_use]
pub fn format_success(message: &str, session_id: Option<&str>) -> String {
    let mut out = format!("{message}\n");
    if let Some(id) = session_id {
        out.push_str(&format!("\n{SESSION_SEPARATOR}\nSESSION_ID: {id}\n"));
    }
    out
}

/// Print the success output to stdout.
pub fn print_success(message: &str, session_id: Option<&str>) {
    let mut stdout = io::stdout().lock();
    let _ = stdout.write_all(format_success(message, session_id).as_bytes());
    let _ = stdout.flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!(
        "{} {message}",
        "ERROR:".if_supports_color(Stream::Stderr, |tag| tag.style(Style::new().red().bold()))
    );
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    eprintln!(
        "{} {message}",
        "WARN:".if_supports_color(Stream::Stderr, |tag| tag.style(Style::new().yellow().bold()))
    );
}

/// Report a finished run and return the process exit code.
pub fn report(outcome: &RunOutcome) -> i32 {
    match &outcome.status {
        RunStatus::Success { message } => print_success(message, outcome.session_id.as_deref()),
        RunStatus::Failure(error) => print_error(&error.to_string()),
    }
    outcome.exit_code()
}
