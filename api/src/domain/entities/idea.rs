//! Idea domain entity
//!
//! Represents one user submission on the board. Records are created once and
//! afterwards only their vote counters change.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

static IDEA_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("static pattern"));

/// Opaque identifier assigned by the Record Store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(pub String);

impl IdeaId {
    /// Parse an ID received from a client. Store keys never contain path
    /// separators or Firebase-reserved characters.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if IDEA_ID_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::Validation(format!("Invalid idea id: {}", raw)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IdeaId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for IdeaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored idea, in the wire shape the Record Store keeps it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaRecord {
    #[serde(rename = "name", default)]
    pub author: String,
    pub text: String,
    /// Milliseconds since epoch; absent while a server timestamp is pending
    #[serde(rename = "timestamp", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(rename = "likes", default)]
    pub like_count: u64,
    #[serde(rename = "dislikes", default)]
    pub dislike_count: u64,
}

/// A validated submission, ready to be appended to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdea {
    pub author: String,
    pub text: String,
}

/// Point-in-time copy of the whole collection, ordered by id
pub type Snapshot = BTreeMap<IdeaId, IdeaRecord>;

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    /// Name of the counter field this vote increments
    pub fn field(&self) -> &'static str {
        match self {
            Vote::Like => "likes",
            Vote::Dislike => "dislikes",
        }
    }
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Vote::Like => write!(f, "like"),
            Vote::Dislike => write!(f, "dislike"),
        }
    }
}

impl std::str::FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" | "likes" | "up" => Ok(Vote::Like),
            "dislike" | "dislikes" | "down" => Ok(Vote::Dislike),
            _ => Err(format!("Unknown vote: {}. Use: likes, dislikes", s)),
        }
    }
}

/// How the feed is selected and ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Everything, most recent first
    #[default]
    Newest,
    /// Everything, by net score
    Top,
    /// Last 24 hours, by likes
    Today,
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterMode::Newest => write!(f, "newest"),
            FilterMode::Top => write!(f, "top"),
            FilterMode::Today => write!(f, "today"),
        }
    }
}

impl std::str::FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" | "new" => Ok(FilterMode::Newest),
            "top" => Ok(FilterMode::Top),
            "today" | "day" => Ok(FilterMode::Today),
            _ => Err(format!(
                "Unknown filter: {}. Use: newest, top, today",
                s
            )),
        }
    }
}
