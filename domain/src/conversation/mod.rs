//! Conversation domain.
//!
//! - [`entities::Conversation`]: a titled, model-bound conversation
//! - [`entities::Message`]: a server-confirmed message
//! - [`transcript::Transcript`]: the open conversation with optimistic send state
//! - [`list::ConversationList`]: newest-first summaries of all conversations
//! - [`effect::ViewEffect`]: how a list mutation affects the open view

pub mod effect;
pub mod entities;
pub mod list;
pub mod transcript;
pub mod wire;
