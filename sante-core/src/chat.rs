//! Assistant chat transcript and the server-sent-event reply decoder.

use serde::{Deserialize, Serialize};

pub const GREETING: &str =
    "Hello! I'm Dawini, your medical assistant. How can I help you today?";
pub const UNAVAILABLE: &str = "I'm temporarily unavailable.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn greeting() -> Self {
        Self::new(ChatRole::Assistant, GREETING)
    }
}

/// Event decoded from the reply stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Done,
}

#[derive(Deserialize)]
struct DeltaPayload {
    #[serde(default)]
    content: Option<String>,
}

/// Incremental decoder for `data: {...}` event streams.
///
/// Bytes are buffered until a blank line closes an event, so chunks may
/// split events (and multi-byte characters) anywhere.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every event it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = find_event_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            let text = String::from_utf8_lossy(&raw[..pos]);
            if let Some(event) = parse_event(&text) {
                events.push(event);
            }
        }
        events
    }

    /// Bytes held back waiting for the end of an event
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_event(part: &str) -> Option<StreamEvent> {
    let data = part.strip_prefix("data: ")?;
    if data.trim() == "[DONE]" {
        return Some(StreamEvent::Done);
    }
    // Malformed payloads are skipped
    let payload: DeltaPayload = serde_json::from_str(data).ok()?;
    payload
        .content
        .filter(|c| !c.is_empty())
        .map(StreamEvent::Delta)
}

/// Conversation as shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Start from stored history, or the greeting when there is none
    pub fn from_history(history: Vec<ChatMessage>) -> Self {
        if history.is_empty() {
            Self {
                messages: vec![ChatMessage::greeting()],
            }
        } else {
            Self { messages: history }
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Add the user's message and an empty assistant message to stream into
    pub fn begin_exchange(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.messages.push(ChatMessage::new(ChatRole::Assistant, ""));
    }

    pub fn append_delta(&mut self, delta: &str) {
        if let Some(last) = self.messages.last_mut()
            && last.role == ChatRole::Assistant
        {
            last.content.push_str(delta);
        }
    }

    /// Replace the pending assistant message with the unavailable notice
    pub fn fail_exchange(&mut self) {
        if self
            .messages
            .last()
            .is_some_and(|m| m.role == ChatRole::Assistant)
        {
            self.messages.pop();
        }
        self.messages.push(ChatMessage::new(ChatRole::System, UNAVAILABLE));
    }

    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
