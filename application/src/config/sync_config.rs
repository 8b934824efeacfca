//! Synchronizer behavior configuration.

use polychat_domain::Model;
use std::time::Duration;

/// Reference quiet interval for search debouncing
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Controls defaults and timing of the synchronizer components.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Model for conversations created without an explicit one.
    pub default_model: Model,
    /// Title for implicitly created conversations. `None` lets the server
    /// apply its placeholder.
    pub default_title: Option<String>,
    /// Quiet interval before a search query is sent.
    pub search_debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_model: Model::default(),
            default_title: None,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl SyncConfig {
    pub fn with_default_model(mut self, model: Model) -> Self {
        self.default_model = model;
        self
    }

    pub fn with_default_title(mut self, title: Option<String>) -> Self {
        self.default_title = title;
        self
    }

    /// Set the debounce interval in milliseconds.
    pub fn with_search_debounce_ms(mut self, millis: u64) -> Self {
        self.search_debounce = Duration::from_millis(millis);
        self
    }
}
