//! Auth types shared across ResourceHub crates.
//!
//! Provides JWT validation, the session cookie, the admin allow-list and the
//! `Identity` / `MaybeIdentity` / `AdminIdentity` extractors that gate every
//! protected endpoint.

pub mod admin;
pub mod cookie;
pub mod identity;
pub mod token;
