//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no household vocabulary in them:
//! - Cryptographic utilities (OS randomness, SHA-256, constant-time comparison)
//! - Client identification from request headers
//! - Rate limiting for PIN guessing

pub mod client;
pub mod crypto;
pub mod rate_limit;
