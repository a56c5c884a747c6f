//! Task identifiers
//!
//! ID Format: `t-{8-char-hash}` (e.g., `t-9d3e5f2a`)
//!
//! Hash is derived from text + creation timestamp + a salt. The store bumps
//! the salt until the ID does not collide with a live task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of hex characters in the hash portion
const HASH_LEN: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{8-char-hash}}', got '{0}'")]
    InvalidTaskId(String),
}

/// Generates the hash portion from text, timestamp and salt
fn generate_hash(text: &str, timestamp: DateTime<Utc>, salt: u32) -> String {
    let input = format!(
        "{}{}{}",
        text,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        salt
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..HASH_LEN].to_string()
}

/// Opaque task identifier in the format `t-{8-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    hash: String,
}

impl TaskId {
    /// Creates a task ID from text and creation timestamp
    pub fn new(text: &str, timestamp: DateTime<Utc>) -> Self {
        Self::salted(text, timestamp, 0)
    }

    /// Creates a task ID with an explicit salt (used to step past collisions)
    pub fn salted(text: &str, timestamp: DateTime<Utc>, salt: u32) -> Self {
        Self {
            hash: generate_hash(text, timestamp, salt),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Returns true if `prefix` is a prefix of this ID, with or without the `t-`
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        let prefix = prefix.trim();
        let bare = prefix.strip_prefix("t-").unwrap_or(prefix);
        !bare.is_empty() && self.hash.starts_with(&bare.to_ascii_lowercase())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.hash)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("t-")
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        if hash.len() != HASH_LEN || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_generation_is_unique_for_different_timestamps() {
        let text = "Same text";
        let ts1 = Utc::now();
        let ts2 = ts1 + chrono::Duration::nanoseconds(1);

        assert_ne!(TaskId::new(text, ts1), TaskId::new(text, ts2));
    }

    #[test]
    fn salt_changes_the_id() {
        let ts = Utc::now();
        assert_ne!(TaskId::salted("x", ts, 0), TaskId::salted("x", ts, 1));
        assert_eq!(TaskId::new("x", ts), TaskId::salted("x", ts, 0));
    }

    #[test]
    fn id_format_is_correct() {
        let s = TaskId::new("Test", Utc::now()).to_string();
        assert!(s.starts_with("t-"));
        assert_eq!(s.len(), 10); // "t-" + 8 chars
    }

    #[test]
    fn id_parses_correctly() {
        let original = TaskId::new("Test", Utc::now());
        let parsed: TaskId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn id_rejects_invalid_format() {
        assert!("invalid".parse::<TaskId>().is_err());
        assert!("t-short".parse::<TaskId>().is_err());
        assert!("t-toolonggggg".parse::<TaskId>().is_err());
        assert!("t-gggggggg".parse::<TaskId>().is_err()); // 'g' is not hex
        assert!("a-12345678".parse::<TaskId>().is_err());
    }

    #[test]
    fn prefix_matching() {
        let id: TaskId = "t-1a2b3c4d".parse().unwrap();
        assert!(id.matches_prefix("1a2"));
        assert!(id.matches_prefix("t-1a2b"));
        assert!(id.matches_prefix("1A2B"));
        assert!(!id.matches_prefix("t-"));
        assert!(!id.matches_prefix(""));
        assert!(!id.matches_prefix("2b"));
    }

    #[test]
    fn serde_as_plain_string() {
        let id: TaskId = "t-1a2b3c4d".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t-1a2b3c4d\"");

        let bad: Result<TaskId, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
