//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Seeker, Quest, QuestSuggestion, Prize, PrizeRedemption, QuestCompletion)
//! - Domain value objects (SeekerPin, Stars, QuestStatus, QuestDuration, Assignees, CertificateId)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod value_objects;
