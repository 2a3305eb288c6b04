//! Cross-cutting plumbing shared by every ResourceHub service.
//!
//! The response envelope and its error codes live here so that every
//! endpoint, extractor rejection and webhook reply renders the same shape.

pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod retry;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
