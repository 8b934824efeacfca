//! Conversation defaults from TOML (`[chat]` section)

use polychat_domain::{ConfigIssue, ConfigIssueCode, Model, Severity};
use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Model id for new conversations
    pub default_model: String,
    /// Title for conversations created implicitly by a first send
    pub default_title: Option<String>,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            default_model: Model::default().to_string(),
            default_title: None,
        }
    }
}

impl FileChatConfig {
    /// Parse the default model, falling back to the built-in default when blank
    pub fn parse_default_model(&self) -> (Model, Vec<ConfigIssue>) {
        let raw = self.default_model.trim();
        if raw.is_empty() {
            let issue = ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::EmptyValue {
                    field: "chat.default_model".to_string(),
                },
                message: format!(
                    "chat.default_model is empty, using '{}'",
                    Model::default()
                ),
            };
            return (Model::default(), vec![issue]);
        }
        (Model::from(raw), Vec::new())
    }
}
