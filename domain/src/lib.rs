//! Domain layer for polychat
//!
//! This crate contains the core entities, value objects and the pure state
//! machines behind the session synchronizer. It performs no I/O and has no
//! dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! The working copy of the open conversation. A send appends a
//! [`PendingMessage`] optimistically, then either confirms it with the
//! server's [`MessagePair`] or rolls it back, restoring the previous entries.
//!
//! ## Conversation list
//!
//! Newest-first summaries of every conversation, replaced with the server's
//! canonical records after each acknowledged mutation.
//!
//! ## Search state
//!
//! Query text plus a generation [`QueryTag`] so that results for a
//! superseded query can never overwrite newer ones.

pub mod config;
pub mod conversation;
pub mod core;
pub mod search;
pub mod util;

// Re-export commonly used types
pub use config::{
    OutputFormat,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use conversation::{
    effect::ViewEffect,
    entities::{
        Conversation, ConversationId, ConversationPatch, Message, MessageId, MessagePair,
        NewConversation, Role,
    },
    list::ConversationList,
    transcript::{LocalMessageId, PendingMessage, SendStatus, Transcript, TranscriptEntry},
};
pub use core::{content::MessageContent, error::DomainError, model::Model};
pub use search::state::{QueryTag, QueryTransition, SearchState, SearchStatus};
