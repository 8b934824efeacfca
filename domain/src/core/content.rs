//! Message content value object

use serde::{Deserialize, Serialize};

/// Trimmed, non-empty text of a user turn (Value Object)
///
/// Construction is the validation step: whitespace-only input never becomes
/// a `MessageContent`, so nothing downstream has to re-check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageContent {
    text: String,
}

impl MessageContent {
    /// Try to create message content, returning None if the trimmed input is empty
    pub fn try_new(content: impl AsRef<str>) -> Option<Self> {
        let trimmed = content.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                text: trimmed.to_string(),
            })
        }
    }

    /// Get the content text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume and return the inner text
    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for MessageContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl TryFrom<String> for MessageContent {
    type Error = &'static str;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::try_new(text).ok_or("message content must not be blank")
    }
}

impl From<MessageContent> for String {
    fn from(content: MessageContent) -> Self {
        content.text
    }
}

impl AsRef<str> for MessageContent {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
