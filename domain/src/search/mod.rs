//! Conversation search domain.
//!
//! - [`state::SearchState`]: query, generation tag and tri-state status
//! - [`state::QueryTransition`]: what a query change asks the debouncer to do

pub mod state;
