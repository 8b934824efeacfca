//! Interactive chat module
//!
//! Provides a readline-based chat interface over the session synchronizer.

mod command;
mod repl;

pub use command::ReplCommand;
pub use repl::{ChatRepl, await_search};
