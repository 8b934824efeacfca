//! Errors surfaced by the synchronizer use cases.

use crate::ports::session_gateway::GatewayError;
use polychat_domain::DomainError;
use thiserror::Error;

/// Error returned to the UI boundary by synchronizer operations.
///
/// Optimistic state introduced by the failing operation has already been
/// rolled back by the time this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("No conversation is open")]
    NoConversationOpen,
}

impl SyncError {
    /// Check if the session must be re-established by the outer shell
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SyncError::Gateway(e) if e.is_unauthorized())
    }

    /// Check if this error is the guard rejecting a concurrent send
    pub fn is_send_in_flight(&self) -> bool {
        matches!(self, SyncError::Domain(e) if e.is_send_in_flight())
    }
}
