//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors and the router.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
