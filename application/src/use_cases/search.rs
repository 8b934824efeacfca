//! Search Debouncer use case.
//!
//! Turns a stream of keystrokes into at most one remote search per quiet
//! interval (trailing edge). Each query change:
//!
//! - bumps the [`QueryTag`] and drops any previous results
//! - cancels the pending timer, if any
//! - schedules a new timer unless the query is blank
//!
//! When a timer fires the search runs under its tag; results that come back
//! after a newer query was typed are discarded. Search is best effort:
//! failures settle with an empty result set, except an expired session,
//! which returns to idle so the shell can handle re-authentication.

use crate::config::SyncConfig;
use crate::ports::session_gateway::SessionGateway;
use crate::ports::sync_journal::{NoSyncJournal, SyncEvent, SyncJournal};
use polychat_domain::{QueryTag, QueryTransition, SearchState};
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Debounced conversation search.
///
/// Cheap to clone; clones share state. Query changes spawn onto the
/// current Tokio runtime.
#[derive(Clone)]
pub struct SearchDebouncer {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn SessionGateway>,
    journal: Arc<dyn SyncJournal>,
    quiet: Duration,
    state: watch::Sender<SearchState>,
    timer: Mutex<Option<CancellationToken>>,
}

impl SearchDebouncer {
    pub fn new(gateway: Arc<dyn SessionGateway>, config: &SyncConfig) -> Self {
        Self::with_parts(gateway, Arc::new(NoSyncJournal), config.search_debounce)
    }

    pub fn with_journal(self, journal: Arc<dyn SyncJournal>) -> Self {
        Self::with_parts(self.inner.gateway.clone(), journal, self.inner.quiet)
    }

    fn with_parts(
        gateway: Arc<dyn SessionGateway>,
        journal: Arc<dyn SyncJournal>,
        quiet: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                journal,
                quiet,
                state: watch::Sender::new(SearchState::new()),
                timer: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Record new query text and (re)schedule the search
    pub fn on_query_change(&self, text: &str) {
        let mut transition = QueryTransition::Cleared;
        self.inner
            .state
            .send_modify(|state| transition = state.query_changed(text));
        self.inner.cancel_timer();

        match transition {
            QueryTransition::Cleared => debug!("Search query cleared"),
            QueryTransition::Schedule { tag, query } => self.schedule(tag, query),
        }
    }

    /// Show the search surface with a fresh, empty state
    pub fn open(&self) {
        self.reset();
    }

    /// Hide the search surface, dropping any pending search and results
    pub fn close(&self) {
        self.reset();
    }

    fn reset(&self) {
        self.inner.cancel_timer();
        self.inner.state.send_modify(SearchState::reset);
    }

    fn schedule(&self, tag: QueryTag, query: String) {
        let token = CancellationToken::new();
        *self.inner.lock_timer() = Some(token.clone());

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Search for {:?} superseded before it ran", query);
                }
                _ = tokio::time::sleep(inner.quiet) => {
                    inner.run(tag, query).await;
                }
            }
        });
    }
}

impl Inner {
    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cancel_timer(&self) {
        if let Some(token) = self.lock_timer().take() {
            token.cancel();
        }
    }

    async fn run(&self, tag: QueryTag, query: String) {
        if !self.state.send_if_modified(|state| state.begin(tag)) {
            return;
        }
        debug!("Searching for {:?}", query);

        match self.gateway.search_conversations(&query).await {
            Ok(results) => {
                let count = results.len();
                if self.state.send_if_modified(|state| state.settle(tag, results)) {
                    debug!("Search for {:?} settled with {} results", query, count);
                    self.journal.record(SyncEvent::new(
                        "search_settled",
                        json!({ "query": query, "results": count }),
                    ));
                } else {
                    debug!("Discarding stale results for {:?}", query);
                }
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Search for {:?} rejected: {}", query, e);
                self.state.send_if_modified(|state| state.abandon(tag));
            }
            Err(e) => {
                warn!("Search for {:?} failed: {}", query, e);
                self.state
                    .send_if_modified(|state| state.settle(tag, Vec::new()));
            }
        }
    }
}
