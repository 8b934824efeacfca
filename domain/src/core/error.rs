//! Domain error types

use thiserror::Error;

/// Domain-level errors raised by the synchronizer state machines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("A message is already awaiting confirmation in this conversation")]
    SendInFlight,

    #[error("No pending message with local id {0}")]
    PendingNotFound(String),

    #[error("Conversation {0} is not open")]
    ConversationNotOpen(String),
}

impl DomainError {
    /// Check if this error is the re-entrancy guard rejecting a second send
    pub fn is_send_in_flight(&self) -> bool {
        matches!(self, DomainError::SendInFlight)
    }
}
