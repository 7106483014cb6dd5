//! Append-only conversation log.
//!
//! The log is the single source of truth for what has been shown to the
//! user. There is no update or delete: a correction is a new message.

use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;

use crate::core::message::{Message, MessageId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogError {
    DuplicateId(MessageId),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::DuplicateId(id) => write!(f, "message id {id} is already in the log"),
        }
    }
}

impl StdError for LogError {}

#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) -> Result<(), LogError> {
        if !self.ids.insert(message.id) {
            return Err(LogError::DuplicateId(message.id));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Read-only view in insertion order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Messages appended after the first `seen` entries.
    pub fn since(&self, seen: usize) -> &[Message] {
        &self.messages[seen.min(self.messages.len())..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
