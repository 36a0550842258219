//! Common ID Types
//!
//! Type-safe string identifiers for Quest Mania entities.
//!
//! Identifiers are opaque strings: the household UI is allowed to pick its own
//! ids when it creates seekers, quests and prizes, and the server falls back to
//! a UUID v4 string when it has to mint one itself.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

/// Longest identifier accepted from a client
pub const MAX_ID_LEN: usize = 64;

/// Error when parsing an identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("identifier must not be empty")]
    Empty,
    #[error("identifier must be at most {MAX_ID_LEN} characters")]
    TooLong,
    #[error("identifier must not contain whitespace or control characters")]
    InvalidCharacter,
}

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type SeekerId = Id<markers::Seeker>;
///
/// let id = SeekerId::parse("seeker-1").unwrap();
/// assert_eq!(id.as_str(), "seeker-1");
/// ```
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Mint a new random ID (UUID v4 string)
    pub fn new() -> Self {
        Self::from_db(Uuid::new_v4().to_string())
    }

    /// Parse a client-supplied identifier
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }
        if trimmed.chars().count() > MAX_ID_LEN {
            return Err(IdError::TooLong);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(IdError::InvalidCharacter);
        }
        Ok(Self::from_db(trimmed.to_string()))
    }

    /// Wrap a value read back from storage without re-validating it
    pub fn from_db(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_db(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Id::parse(raw).map_err(serde::de::Error::custom)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    pub struct Seeker;
    pub struct Quest;
    pub struct QuestSuggestion;
    pub struct Prize;
    pub struct PrizeRedemption;
    pub struct QuestCompletion;
}

pub type SeekerId = Id<markers::Seeker>;
pub type QuestId = Id<markers::Quest>;
pub type SuggestionId = Id<markers::QuestSuggestion>;
pub type PrizeId = Id<markers::Prize>;
pub type RedemptionId = Id<markers::PrizeRedemption>;
pub type CompletionId = Id<markers::QuestCompletion>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_uuid_strings() {
        let id = QuestId::new();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(QuestId::new(), QuestId::new());
    }

    #[test]
    fn test_parse_trims_and_validates() {
        let id = SeekerId::parse("  seeker-1 ").unwrap();
        assert_eq!(id.as_str(), "seeker-1");

        assert_eq!(SeekerId::parse("   "), Err(IdError::Empty));
        assert_eq!(SeekerId::parse("a b"), Err(IdError::InvalidCharacter));
        assert_eq!(SeekerId::parse("x".repeat(65)), Err(IdError::TooLong));
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = PrizeId::parse("prize-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""prize-1""#);

        let back: PrizeId = serde_json::from_str(r#""prize-1""#).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<PrizeId>(r#""""#).is_err());
    }
}
