//! Session expiry signal.

use std::sync::Arc;
use tokio::sync::watch;

/// Flag raised when the backend rejects the session (HTTP 401).
///
/// The synchronizer never interprets 401s itself; the shell watches this
/// flag and sends the user back through authentication. Clones share the
/// flag.
#[derive(Debug, Clone)]
pub struct SessionExpiry {
    flag: Arc<watch::Sender<bool>>,
}

impl Default for SessionExpiry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionExpiry {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Raise the flag. Repeated signals notify watchers once.
    pub fn signal(&self) {
        self.flag.send_if_modified(|expired| !std::mem::replace(expired, true));
    }

    /// Lower the flag after the session was re-established
    pub fn reset(&self) {
        self.flag.send_if_modified(|expired| std::mem::replace(expired, false));
    }

    pub fn is_expired(&self) -> bool {
        *self.flag.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.flag.subscribe()
    }
}
