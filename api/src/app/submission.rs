//! Submission validation
//!
//! Normalizes a raw submission before anything is written to the store.

use crate::domain::entities::NewIdea;
use crate::error::DomainError;

/// Display name used when the author leaves the field empty
pub const ANONYMOUS: &str = "Anonymous";

/// What to do with text longer than the limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Refuse the submission
    #[default]
    Reject,
    /// Keep the first `max_text_len` characters
    Truncate,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(OverflowPolicy::Reject),
            "truncate" => Ok(OverflowPolicy::Truncate),
            _ => Err(format!("Unknown overflow policy: {}", s)),
        }
    }
}

/// Limits applied to new ideas. Lengths count characters, not bytes.
#[derive(Debug, Clone)]
pub struct SubmissionPolicy {
    pub max_text_len: usize,
    pub max_author_len: usize,
    pub overflow: OverflowPolicy,
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            max_text_len: Self::DEFAULT_MAX_TEXT_LEN,
            max_author_len: Self::DEFAULT_MAX_AUTHOR_LEN,
            overflow: OverflowPolicy::Reject,
        }
    }
}

impl SubmissionPolicy {
    pub const DEFAULT_MAX_TEXT_LEN: usize = 300;
    pub const DEFAULT_MAX_AUTHOR_LEN: usize = 30;

    /// Validate and normalize a submission
    pub fn validate(&self, author: Option<&str>, text: &str) -> Result<NewIdea, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::Validation("Write an idea first".to_string()));
        }

        let text_len = text.chars().count();
        let text = if text_len <= self.max_text_len {
            text.to_string()
        } else {
            match self.overflow {
                OverflowPolicy::Reject => {
                    return Err(DomainError::Validation(format!(
                        "Idea is too long ({} characters, max {})",
                        text_len, self.max_text_len
                    )));
                }
                OverflowPolicy::Truncate => take_chars(text, self.max_text_len),
            }
        };

        let author = author.map(str::trim).unwrap_or_default();
        let author = if author.is_empty() {
            ANONYMOUS.to_string()
        } else {
            take_chars(author, self.max_author_len)
        };

        Ok(NewIdea { author, text })
    }
}

fn take_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
