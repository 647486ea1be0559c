//! Event types from `codex exec --json` output.
//!
//! Codex emits many event types; only the two needed to report a result are
//! modeled. Everything else, including known types whose fields have an
//! unexpected shape, decodes to [`CodexEvent::Unknown`].

use serde::{Deserialize, Serialize};

/// Agent message text: either a whole string or ordered fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    Text(String),
    Fragments(Vec<String>),
    /// Any other JSON shape.
    Other(serde_json::Value),
}

impl MessageText {
    /// Normalize to a single string.
    ///
    /// Fragments are concatenated with no separator. Returns `None` for any
    /// other shape.
    #[must_use]
    pub fn normalize(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Fragments(parts) => Some(parts.concat()),
            Self::Other(_) => None,
        }
    }
}

impl Default for MessageText {
    fn default() -> Self {
        Self::Other(serde_json::Value::Null)
    }
}

/// Item carried by an `item.completed` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadItem {
    /// Final human-readable agent output.
    AgentMessage {
        #[serde(default)]
        text: MessageText,
    },
    /// Catch-all for reasoning, command executions, file changes, etc.
    #[serde(other)]
    Unknown,
}

/// Events emitted by Codex on stdout, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CodexEvent {
    /// A new (or resumed) thread started.
    #[serde(rename = "thread.started")]
    ThreadStarted {
        /// Identifier usable with `codex e resume`.
        thread_id: String,
    },
    /// An item finished.
    #[serde(rename = "item.completed")]
    ItemCompleted { item: ThreadItem },
    /// Catch-all for unknown event types.
    #[serde(other)]
    Unknown,
}

impl CodexEvent {
    /// Interpret an already-decoded JSON value.
    ///
    /// Shapes that do not match a modeled event yield `Unknown` rather than
    /// an error.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or(Self::Unknown)
    }

    /// Returns the thread (session) id if this is a `thread.started` event.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::ThreadStarted { thread_id } => Some(thread_id),
            _ => None,
        }
    }

    /// Returns the normalized agent message text, if this event carries one.
    #[must_use]
    pub fn agent_message(&self) -> Option<String> {
        match self {
            Self::ItemCompleted {
                item: ThreadItem::AgentMessage { text },
            } => text.normalize(),
            _ => None,
        }
    }
}
