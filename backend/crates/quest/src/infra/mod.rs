//! Infrastructure Layer
//!
//! Repository implementations: PostgreSQL for the server, an in-memory store
//! for tests and local demos.

pub mod memory;
pub mod postgres;
