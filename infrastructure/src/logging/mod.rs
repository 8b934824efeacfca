//! Logging infrastructure: structured sync journaling.
//!
//! Provides [`JsonlSyncJournal`], a JSONL file writer that implements
//! the [`SyncJournal`](polychat_application::SyncJournal) port.

mod jsonl_journal;

pub use jsonl_journal::JsonlSyncJournal;
