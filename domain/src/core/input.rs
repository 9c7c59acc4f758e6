//! User input value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Longest message accepted from a user, in characters
pub const MAX_INPUT_CHARS: usize = 5000;

/// A natural-language request typed by the user (Value Object)
///
/// Leading and trailing whitespace is removed; the content is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    content: String,
}

impl UserInput {
    /// Create a new input, rejecting blank text and anything over [`MAX_INPUT_CHARS`].
    pub fn try_new(content: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = content.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyInput);
        }
        if trimmed.chars().count() > MAX_INPUT_CHARS {
            return Err(DomainError::InputTooLong {
                limit: MAX_INPUT_CHARS,
            });
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for UserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
