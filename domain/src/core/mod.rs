//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: backend model identifiers (GPT, Claude, custom)
//! - [`content::MessageContent`]: validated text of a user turn
//! - [`error::DomainError`]: domain-level errors

pub mod content;
pub mod error;
pub mod model;
