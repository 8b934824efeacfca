//! Remote Session Gateway port
//!
//! Defines the stateless contract to the chat backend. Implementations
//! (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use polychat_domain::{
    Conversation, ConversationId, ConversationPatch, MessageContent, MessagePair, NewConversation,
};
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The session is no longer valid (401). Handled by the outer shell,
    /// never reported as a domain failure.
    #[error("Session expired or not authenticated")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected by server: {0}")]
    Validation(String),

    #[error("Model failed to respond: {0}")]
    Upstream(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Timeout")]
    Timeout,

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Check if this error signals an invalid session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }
}

/// Gateway to the conversation backend
///
/// Every operation is a single remote call with no local state. Summaries
/// returned by `list_conversations` and `search_conversations` carry no
/// embedded messages; `get_conversation` returns them.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// List all conversation summaries, newest first
    async fn list_conversations(&self) -> Result<Vec<Conversation>, GatewayError>;

    /// Create a conversation
    async fn create_conversation(
        &self,
        request: &NewConversation,
    ) -> Result<Conversation, GatewayError>;

    /// Fetch a conversation including its messages
    async fn get_conversation(&self, id: &ConversationId) -> Result<Conversation, GatewayError>;

    /// Persist a partial update and return the canonical record
    async fn update_conversation(
        &self,
        id: &ConversationId,
        patch: &ConversationPatch,
    ) -> Result<Conversation, GatewayError>;

    /// Delete a conversation
    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), GatewayError>;

    /// Search conversation titles and message contents
    async fn search_conversations(&self, query: &str) -> Result<Vec<Conversation>, GatewayError>;

    /// Append a user turn and receive the stored message and the generated reply
    async fn append_message(
        &self,
        id: &ConversationId,
        content: &MessageContent,
    ) -> Result<MessagePair, GatewayError>;
}
