//! Port for structured synchronizer journaling.
//!
//! Defines the [`SyncJournal`] trait for recording synchronizer events
//! (optimistic sends, rollbacks, list mutations, settled searches) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures a machine-readable
//! record of every state transition (JSONL).

use serde_json::Value;

/// A structured synchronizer event.
pub struct SyncEvent {
    /// Event type identifier (e.g., "send_pending", "send_rolled_back").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl SyncEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for journaling synchronizer events.
///
/// `record` is synchronous and infallible; journal failures never disturb
/// the synchronizer.
pub trait SyncJournal: Send + Sync {
    fn record(&self, event: SyncEvent);
}

/// No-op implementation for tests and when journaling is disabled.
pub struct NoSyncJournal;

impl SyncJournal for NoSyncJournal {
    fn record(&self, _event: SyncEvent) {}
}
