//! Backend connection configuration from TOML (`[server]` section)

use polychat_domain::{ConfigIssue, ConfigIssueCode, Severity};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Raw server configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// Backend root; routes live under `/api`
    pub base_url: String,
    /// Sent verbatim as the `Cookie` header (e.g. `session=...`)
    pub session_cookie: Option<String>,
    /// Per-request timeout; unset waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            request_timeout_secs: None,
        }
    }
}

impl FileServerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let url = self.base_url.trim();
        if url.is_empty() {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::EmptyValue {
                    field: "server.base_url".to_string(),
                },
                message: "server.base_url is empty".to_string(),
            });
        } else if let Err(reason) = check_base_url(url) {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::InvalidUrl {
                    field: "server.base_url".to_string(),
                    value: self.base_url.clone(),
                },
                message: format!("server.base_url: '{}' {}", self.base_url, reason),
            });
        }

        if self.request_timeout_secs == Some(0) {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::ZeroDuration {
                    field: "server.request_timeout_secs".to_string(),
                },
                message: "server.request_timeout_secs is 0, requests will time out immediately"
                    .to_string(),
            });
        }

        issues
    }
}

/// An absolute http(s) URL with a host
fn check_base_url(url: &str) -> Result<(), String> {
    let parsed = Url::parse(url).map_err(|e| format!("is not a valid URL: {}", e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("must use http or https, not '{}'", parsed.scheme()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("has no host".to_string());
    }
    Ok(())
}
