//! Domain types shared across ResourceHub crates.
//!
//! Pure types only, no framework dependencies. Import in `usecase/` and
//! `domain/` layers; `infra/` maps them to and from storage rows.

pub mod credit;
pub mod order;
pub mod pagination;
pub mod rating;
pub mod resource;
pub mod user;
