//! Application layer for polychat
//!
//! This crate contains the synchronizer use cases and the port definitions
//! they depend on. Adapters for the ports live in the infrastructure layer.
//!
//! # Components
//!
//! - [`MessageReconciler`]: optimistic send, rollback and reconciliation
//!   of the open conversation
//! - [`SessionListCache`]: newest-first conversation summaries, updated
//!   only after the gateway acknowledges a mutation
//! - [`SearchDebouncer`]: trailing-edge debounced search with stale
//!   response rejection
//! - [`ChatClient`]: wires the three together and routes view effects
//!
//! Every component owns its state in a `tokio::sync::watch` channel so the
//! UI can render intermediate states (a pending message, a running search)
//! while a remote call is in flight.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

pub use config::SyncConfig;
pub use error::SyncError;
pub use ports::{
    session_gateway::{GatewayError, SessionGateway},
    sync_journal::{NoSyncJournal, SyncEvent, SyncJournal},
};
pub use use_cases::{
    chat_client::ChatClient,
    reconcile::{MessageReconciler, SendOutcome},
    search::SearchDebouncer,
    session_list::SessionListCache,
};
