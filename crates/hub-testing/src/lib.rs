//! Test utilities for ResourceHub crates.
//!
//! Signed test identities and envelope readers. Import from tests only.

pub mod auth;
pub mod envelope;
