//! Domain Value Objects
//!
//! Immutable value types for the Quest Mania domain.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use kernel::id::SeekerId;
use platform::crypto::{BASE36_UPPER, random_code};
use serde::{Deserialize, Deserializer, Serialize};

/// Four-digit seeker PIN
#[derive(Clone, PartialEq, Eq)]
pub struct SeekerPin(String);

impl SeekerPin {
    pub const LEN: usize = 4;

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() == Self::LEN && value.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print the digits
impl fmt::Debug for SeekerPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SeekerPin(****)")
    }
}

impl<'de> Deserialize<'de> for SeekerPin {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SeekerPin::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom("pin must be exactly 4 digits"))
    }
}

/// Star amount (balance, reward or cost); never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Stars(i32);

impl Stars {
    pub const ZERO: Stars = Stars(0);

    /// A balance: zero or more
    pub fn new(value: i32) -> Option<Self> {
        (value >= 0).then_some(Self(value))
    }

    /// A reward or a price: strictly positive
    pub fn positive(value: i32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> i32 {
        self.0
    }

    pub fn checked_add(self, other: Stars) -> Option<Stars> {
        self.0.checked_add(other.0).map(Stars)
    }

    /// `None` when the balance would go negative
    pub fn checked_sub(self, other: Stars) -> Option<Stars> {
        self.0.checked_sub(other.0).and_then(Stars::new)
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quest lifecycle state
///
/// `active -> in_progress -> pending -> completed`, plus the reject edge
/// `pending -> in_progress`. `completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    Active,
    InProgress,
    Pending,
    Completed,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::Active => "active",
            QuestStatus::InProgress => "in_progress",
            QuestStatus::Pending => "pending",
            QuestStatus::Completed => "completed",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "active" => Some(QuestStatus::Active),
            "in_progress" => Some(QuestStatus::InProgress),
            "pending" => Some(QuestStatus::Pending),
            "completed" => Some(QuestStatus::Completed),
            _ => None,
        }
    }

    /// Open quests show up on a seeker's board
    pub fn is_open(&self) -> bool {
        !matches!(self, QuestStatus::Completed)
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a started quest must run before it can be handed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestDuration {
    #[default]
    None,
    Daily,
    Weekly,
}

impl QuestDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestDuration::None => "none",
            QuestDuration::Daily => "daily",
            QuestDuration::Weekly => "weekly",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "none" => Some(QuestDuration::None),
            "daily" => Some(QuestDuration::Daily),
            "weekly" => Some(QuestDuration::Weekly),
            _ => None,
        }
    }

    pub fn period(&self) -> Option<Duration> {
        match self {
            QuestDuration::None => None,
            QuestDuration::Daily => Some(Duration::days(1)),
            QuestDuration::Weekly => Some(Duration::days(7)),
        }
    }

    /// Earliest moment a quest started at `started_at` may be completed
    pub fn ready_at(&self, started_at: DateTime<Utc>) -> DateTime<Utc> {
        match self.period() {
            Some(period) => started_at + period,
            None => started_at,
        }
    }
}

/// Review state shared by suggestions and completion requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }
}

pub type SuggestionStatus = ReviewStatus;
pub type CompletionStatus = ReviewStatus;

/// Seekers a quest is assigned to
///
/// Always a set: duplicates are dropped, insertion order is kept. An empty
/// set means the quest is open to every seeker. On input a single id string
/// is accepted as a one-element set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Assignees(Vec<SeekerId>);

impl Assignees {
    pub fn new(ids: impl IntoIterator<Item = SeekerId>) -> Self {
        let mut unique: Vec<SeekerId> = Vec::new();
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Self(unique)
    }

    pub fn single(id: SeekerId) -> Self {
        Self(vec![id])
    }

    /// Whether `seeker` may work on the quest
    pub fn admits(&self, seeker: &SeekerId) -> bool {
        self.is_empty() || self.contains(seeker)
    }

    pub fn contains(&self, seeker: &SeekerId) -> bool {
        self.0.contains(seeker)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_db(&self) -> Vec<String> {
        self.0.iter().map(|id| id.as_str().to_string()).collect()
    }

    pub fn from_db(values: Vec<String>) -> Self {
        Self::new(values.into_iter().map(SeekerId::from_db))
    }
}

impl<'de> Deserialize<'de> for Assignees {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(SeekerId),
            Many(Vec<SeekerId>),
        }

        Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
            None => Assignees::default(),
            Some(OneOrMany::One(id)) => Assignees::single(id),
            Some(OneOrMany::Many(ids)) => Assignees::new(ids),
        })
    }
}

/// Redemption certificate handed to the seeker, e.g. `QM-4F7K2Z9A`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    pub const CODE_LEN: usize = 8;

    pub fn generate(prefix: &str) -> Self {
        Self(format!(
            "{prefix}-{}",
            random_code(Self::CODE_LEN, BASE36_UPPER)
        ))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeker_pin_requires_four_digits() {
        assert_eq!(SeekerPin::parse("0606").unwrap().as_str(), "0606");
        assert_eq!(SeekerPin::parse(" 1234 ").unwrap().as_str(), "1234");
        assert!(SeekerPin::parse("123").is_none());
        assert!(SeekerPin::parse("12345").is_none());
        assert!(SeekerPin::parse("12a4").is_none());
        assert_eq!(format!("{:?}", SeekerPin::parse("1234").unwrap()), "SeekerPin(****)");
    }

    #[test]
    fn test_stars_never_negative() {
        assert!(Stars::new(-1).is_none());
        assert_eq!(Stars::new(0), Some(Stars::ZERO));
        assert!(Stars::positive(0).is_none());

        let three = Stars::new(3).unwrap();
        let four = Stars::new(4).unwrap();
        assert_eq!(three.checked_sub(four), None);
        assert_eq!(four.checked_sub(three), Stars::new(1));
        assert_eq!(three.checked_add(four), Stars::new(7));
    }

    #[test]
    fn test_quest_status_codes() {
        for status in [
            QuestStatus::Active,
            QuestStatus::InProgress,
            QuestStatus::Pending,
            QuestStatus::Completed,
        ] {
            assert_eq!(QuestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            serde_json::to_string(&QuestStatus::InProgress).unwrap(),
            r#""in_progress""#
        );
        assert!(QuestStatus::parse("done").is_none());
    }

    #[test]
    fn test_duration_ready_at() {
        let started = DateTime::parse_from_rfc3339("2026-01-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(QuestDuration::None.ready_at(started), started);
        assert_eq!(
            QuestDuration::Daily.ready_at(started),
            started + Duration::hours(24)
        );
        assert_eq!(
            QuestDuration::Weekly.ready_at(started),
            started + Duration::days(7)
        );
    }

    #[test]
    fn test_assignees_dedup_and_single_value() {
        let a = SeekerId::parse("s1").unwrap();
        let b = SeekerId::parse("s2").unwrap();

        let set = Assignees::new([a.clone(), b.clone(), a.clone()]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_db(), vec!["s1", "s2"]);

        let one: Assignees = serde_json::from_str(r#""s1""#).unwrap();
        assert_eq!(one, Assignees::single(a.clone()));

        let many: Assignees = serde_json::from_str(r#"["s2","s2","s1"]"#).unwrap();
        assert_eq!(many.to_db(), vec!["s2", "s1"]);

        let none: Assignees = serde_json::from_str("null").unwrap();
        assert!(none.is_empty());
        assert!(none.admits(&b));
        assert!(!Assignees::single(a).admits(&b));
    }

    #[test]
    fn test_certificate_id_format() {
        let cert = CertificateId::generate("QM");
        let code = cert.as_str().strip_prefix("QM-").unwrap();
        assert_eq!(code.len(), CertificateId::CODE_LEN);
        assert!(code.bytes().all(|b| BASE36_UPPER.contains(&b)));
        assert_ne!(CertificateId::generate("QM"), cert);
    }
}
