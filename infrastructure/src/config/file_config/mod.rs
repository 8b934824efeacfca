//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod chat;
mod journal;
mod output;
mod search;
mod server;

pub use chat::FileChatConfig;
pub use journal::FileJournalConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use search::FileSearchConfig;
pub use server::FileServerConfig;

use polychat_application::SyncConfig;
use polychat_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection
    pub server: FileServerConfig,
    /// Conversation defaults
    pub chat: FileChatConfig,
    /// Search debouncing
    pub search: FileSearchConfig,
    /// Sync journal output
    pub journal: FileJournalConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.server.validate());
        issues.extend(self.chat.parse_default_model().1);
        issues.extend(self.search.validate());
        issues
    }

    /// Build the synchronizer configuration
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            default_model: self.chat.parse_default_model().0,
            default_title: self
                .chat
                .default_title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            search_debounce: Duration::from_millis(self.search.debounce_ms),
        }
    }
}
