//! Streaming value types

use serde::{Deserialize, Serialize};

/// One incremental fragment of generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDelta {
    pub text: String,
}

impl TextDelta {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for TextDelta {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// A server-sent event as framed off the wire.
///
/// `event` is `None` when the server sent only `data:` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    pub event: Option<String>,
    pub data: String,
}

impl StreamEvent {
    pub fn is_error(&self) -> bool {
        matches!(self.event.as_deref(), Some("error") | Some("error_event"))
    }
}

/// Observable state of a delta sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// More deltas may follow.
    Streaming,
    /// The server signalled end of stream (sentinel or end of body).
    Completed,
    /// A terminal error was reported; already-emitted deltas stand.
    Failed,
}

impl StreamState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StreamState::Streaming)
    }
}
