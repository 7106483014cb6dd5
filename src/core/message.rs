use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ArtifactSpec, ToolResult};

/// Log key for a message. Derived from creation time and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall classification of an agent message, derived from its tool results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBadge {
    Success,
    Warning,
    Error,
}

impl StatusBadge {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusBadge::Success => "success",
            StatusBadge::Warning => "warning",
            StatusBadge::Error => "error",
        }
    }
}

/// One turn in the conversation. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Display order is array order.
    pub components: Vec<ArtifactSpec>,
    /// Always empty for user messages.
    pub tool_results: Vec<ToolResult>,
    /// `None` when no tool results were attached.
    pub status: Option<StatusBadge>,
}

impl Message {
    pub fn user(id: MessageId, timestamp: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            timestamp,
            components: Vec::new(),
            tool_results: Vec::new(),
            status: None,
        }
    }

    /// A plain agent bubble with no artifacts, used for notices and failures.
    pub fn agent_text(id: MessageId, timestamp: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Agent,
            content: content.into(),
            timestamp,
            components: Vec::new(),
            tool_results: Vec::new(),
            status: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }

    pub fn buttons(&self) -> impl Iterator<Item = &crate::api::ButtonSpec> {
        self.components.iter().filter_map(ArtifactSpec::as_button)
    }
}
