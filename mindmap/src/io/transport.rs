//! Chat transport seam.
//!
//! The [`ChatTransport`] trait decouples mind-map generation from the actual
//! chat backend (vendor HTTP APIs are out of scope here). Tests use scripted
//! transports that return predetermined replies without any network.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Role tag of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of an ordered chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Token accounting reported by a backend, when available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// A complete assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Abstraction over chat backends.
///
/// Transport failures are surfaced as errors; the pipeline never swallows
/// them. Streaming delivers fragments whose concatenation equals the
/// complete reply text.
pub trait ChatTransport {
    /// Send the full message history and wait for a complete reply.
    fn send(&self, messages: &[ChatMessage]) -> Result<ChatReply>;

    /// Send and deliver the reply incrementally. The default delegates to
    /// [`ChatTransport::send`] and emits the whole text as one fragment.
    fn send_streaming(
        &self,
        messages: &[ChatMessage],
        on_fragment: &mut dyn FnMut(&str),
    ) -> Result<ChatReply> {
        let reply = self.send(messages)?;
        if !reply.text.is_empty() {
            on_fragment(&reply.text);
        }
        Ok(reply)
    }
}

/// Decode one SSE-style stream line (`data: {json}`) into a content fragment.
///
/// Blank lines and the `[DONE]` sentinel yield `None`. A malformed payload is
/// logged and skipped so the stream keeps going; it never aborts decoding.
pub fn decode_stream_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "data: [DONE]" {
        return None;
    }
    let payload = trimmed.strip_prefix("data: ")?;
    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "skipping malformed stream fragment");
            return None;
        }
    };
    value
        .pointer("/choices/0/delta/content")
        .and_then(serde_json::Value::as_str)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}
