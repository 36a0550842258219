//! Quest Mania Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, extractors and router
//!
//! ## Household Rules
//! - Stars only move inside repository transactions: approving a quest
//!   credits its reward once, redeeming a prize debits its catalog cost once
//! - A seeker's balance never goes negative
//! - Master-only routes require the `X-Master-Pin` header on every request
//! - Seeker PINs are write-only; they never appear in a response

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::QuestConfig;
pub use error::{QuestError, QuestResult};
pub use infra::memory::MemoryQuestRepository;
pub use infra::postgres::PgQuestRepository;
pub use presentation::router::{quest_router, quest_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
