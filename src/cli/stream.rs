//! Stream parser for Codex stdout.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, Receiver};

use crate::cli::CodexEvent;
use crate::display;

/// Default buffer size for the event channel.
pub const DEFAULT_CHANNEL_BUFFER: usize = 100;

/// Error type for stream operations.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    /// The line is not valid JSON.
    #[error("Failed to parse line: {input}")]
    ParseError { input: String, reason: String },
    /// The line is blank.
    #[error("Empty line")]
    EmptyLine,
}

/// Newline-delimited JSON parser for `codex exec --json` output.
pub struct StreamParser;

impl StreamParser {
    /// Parse a single line of output.
    ///
    /// Surrounding whitespace is ignored. Valid JSON that does not match a
    /// modeled event parses to [`CodexEvent::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns `StreamError::EmptyLine` for blank input and
    /// `StreamError::ParseError` if the line is not valid JSON.
    pub fn parse_line(line: &str) -> Result<CodexEvent, StreamError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(StreamError::EmptyLine);
        }

        serde_json::from_str::<serde_json::Value>(line)
            .map(CodexEvent::from_value)
            .map_err(|e| StreamError::ParseError {
                input: line.to_string(),
                reason: e.to_string(),
            })
    }

    /// Spawn a task that decodes `reader` line by line into a channel.
    ///
    /// Malformed lines are reported as warnings and skipped. The channel
    /// closes once the reader reaches end-of-data. A trailing fragment with
    /// no newline is dropped.
    pub fn into_channel<R>(reader: R, buffer: usize) -> Receiver<CodexEvent>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer);

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            let mut lines = 0usize;
            let mut malformed = 0usize;

            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) if buf.last() != Some(&b'\n') => {
                        tracing::debug!(bytes = buf.len(), "Dropping unterminated final line");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read Codex stdout");
                        break;
                    }
                }

                lines += 1;
                let line = String::from_utf8_lossy(&buf);
                match Self::parse_line(&line) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            tracing::debug!("Event receiver dropped, stopping reader");
                            break;
                        }
                    }
                    Err(StreamError::EmptyLine) => {}
                    Err(e @ StreamError::ParseError { .. }) => {
                        malformed += 1;
                        display::print_warning(&e.to_string());
                    }
                }
            }

            tracing::debug!(lines, malformed, "Codex stdout closed");
        });

        rx
    }
}

/// Session state accumulated from the event stream.
///
/// Owned by a single consumer; events are applied in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAccumulator {
    session_id: Option<String>,
    last_message: Option<String>,
    events: usize,
}

impl EventAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the accumulated state.
    ///
    /// The latest `thread.started` id and the latest non-empty agent message
    /// win.
    pub fn apply(&mut self, event: &CodexEvent) {
        self.events = self.events.saturating_add(1);

        if let Some(id) = event.thread_id() {
            tracing::debug!(session_id = id, "Captured session id");
            self.session_id = Some(id.to_string());
        }

        if let Some(text) = event.agent_message().filter(|t| !t.is_empty()) {
            tracing::debug!(chars = text.chars().count(), "Captured agent message");
            self.last_message = Some(text);
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Number of decoded events applied so far.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events
    }

    /// Split into `(session_id, last_message)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        (self.session_id, self.last_message)
    }
}
