//! Model value object identifying which backend model answers a conversation

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend model identifier (Value Object)
///
/// The backend dispatches on the identifier string, so unknown identifiers
/// are preserved verbatim as [`Model::Custom`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // OpenAI models
    Gpt4,
    Gpt35Turbo,
    // Anthropic models
    Claude3Opus,
    Claude35Sonnet,
    Claude3Haiku,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4 => "gpt-4",
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Claude3Opus => "claude-3-opus-20240229",
            Model::Claude35Sonnet => "claude-3-5-sonnet-20241022",
            Model::Claude3Haiku => "claude-3-haiku-20240307",
            Model::Custom(s) => s,
        }
    }

    /// Check if this is a Claude model
    pub fn is_claude(&self) -> bool {
        self.as_str().starts_with("claude-")
    }

    /// Check if this is a GPT model
    pub fn is_gpt(&self) -> bool {
        self.as_str().starts_with("gpt-")
    }

    /// Short provider label used in listings
    pub fn provider(&self) -> &'static str {
        if self.is_gpt() {
            "openai"
        } else if self.is_claude() {
            "anthropic"
        } else {
            "custom"
        }
    }
}

impl Default for Model {
    /// Returns the default model (GPT-4)
    fn default() -> Self {
        Model::Gpt4
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::from(s))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s {
            "gpt-4" => Model::Gpt4,
            "gpt-3.5-turbo" => Model::Gpt35Turbo,
            "claude-3-opus-20240229" => Model::Claude3Opus,
            "claude-3-5-sonnet-20241022" => Model::Claude35Sonnet,
            "claude-3-haiku-20240307" => Model::Claude3Haiku,
            other => Model::Custom(other.to_string()),
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
