//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest core of vocabulary shared by every Quest Mania crate:
//! - The unified error type, its HTTP classification and conversions
//! - Typed identifiers for the household entities (seekers, quests, prizes, ...)
//!
//! Only things with the same meaning across all contexts belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
