//! Test-only helpers for scripting chat transports.

use std::cell::RefCell;

use anyhow::{Result, anyhow};

use crate::io::transport::{ChatMessage, ChatReply, ChatTransport};

/// Transport returning a fixed reply while capturing sent messages.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    reply: String,
    sent: RefCell<Vec<ChatMessage>>,
}

impl ScriptedTransport {
    /// Transport that answers every send with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            sent: RefCell::new(Vec::new()),
        }
    }

    /// Messages captured from the most recent send.
    pub fn sent(&self) -> Vec<ChatMessage> {
        self.sent.borrow().clone()
    }
}

impl ChatTransport for ScriptedTransport {
    fn send(&self, messages: &[ChatMessage]) -> Result<ChatReply> {
        *self.sent.borrow_mut() = messages.to_vec();
        Ok(ChatReply {
            text: self.reply.clone(),
            usage: None,
        })
    }
}

/// Transport that always fails, for surfacing transport errors.
#[derive(Debug, Default)]
pub struct FailingTransport;

impl ChatTransport for FailingTransport {
    fn send(&self, _messages: &[ChatMessage]) -> Result<ChatReply> {
        Err(anyhow!("connection refused"))
    }
}
