//! Application Layer - Use Cases
//!
//! Orchestrates domain rules and repositories. Handlers build a use case per
//! request from the shared state and call one method on it.

pub mod config;
pub mod master_auth;
pub mod pin_attempts;
pub mod prizes;
pub mod quest_lifecycle;
pub mod quests;
pub mod redeem_prize;
pub mod seekers;
pub mod suggestions;

/// Trim a required text field, rejecting blanks
pub(crate) fn required_text(field: &str, value: &str) -> crate::error::QuestResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(crate::error::QuestError::validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value.to_string())
}
