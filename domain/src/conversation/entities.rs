//! Conversation domain entities

use super::wire;
use crate::core::model::Model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned conversation identifier (opaque)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        wire::identifier(deserializer).map(Self)
    }
}

/// Server-assigned message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        wire::identifier(deserializer).map(Self)
    }
}

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A server-confirmed message (Entity)
///
/// Role and owning conversation are fixed at creation; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub role: Role,
    #[serde(deserialize_with = "wire::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "chat_id")]
    pub conversation_id: ConversationId,
}

/// The stored user turn and generated reply returned by the backend.
///
/// Field names carry the ordering contract: the reconciler always appends
/// `user` first, then `assistant`, regardless of wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePair {
    pub user: Message,
    pub assistant: Message,
}

/// A conversation with its metadata and, when open, its messages (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub model: Model,
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "wire::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl Conversation {
    /// Metadata-only projection (no embedded messages)
    pub fn into_summary(mut self) -> Self {
        self.messages = None;
        self
    }

    /// Split into the summary and its embedded messages (empty if none)
    pub fn split_messages(mut self) -> (Self, Vec<Message>) {
        let messages = self.messages.take().unwrap_or_default();
        (self, messages)
    }
}

/// Request to create a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConversation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub model: Model,
}

impl NewConversation {
    /// Build a creation request; a blank title is treated as absent.
    pub fn new(title: Option<&str>, model: Model) -> Self {
        Self {
            title: normalize_title(title),
            model,
        }
    }
}

/// Partial update of a conversation's mutable fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
}

impl ConversationPatch {
    pub fn title(title: impl AsRef<str>) -> Self {
        Self {
            title: normalize_title(Some(title.as_ref())),
            model: None,
        }
    }

    pub fn model(model: Model) -> Self {
        Self {
            title: None,
            model: Some(model),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Drop a blank title so it is never sent to the backend
    pub fn normalized(self) -> Self {
        Self {
            title: normalize_title(self.title.as_deref()),
            model: self.model,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.model.is_none()
    }
}

fn normalize_title(title: Option<&str>) -> Option<String> {
    title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
