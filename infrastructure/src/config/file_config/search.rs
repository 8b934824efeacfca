//! Search configuration from TOML (`[search]` section)

use polychat_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// Raw search configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSearchConfig {
    /// Quiet interval before a query is sent, in milliseconds
    pub debounce_ms: u64,
}

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl FileSearchConfig {
    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        if self.debounce_ms > 0 {
            return Vec::new();
        }
        vec![ConfigIssue {
            severity: Severity::Warning,
            code: ConfigIssueCode::ZeroDuration {
                field: "search.debounce_ms".to_string(),
            },
            message: "search.debounce_ms is 0, every keystroke will search".to_string(),
        }]
    }
}
