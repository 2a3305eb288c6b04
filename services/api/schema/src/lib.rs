//! sea-orm entities for the ResourceHub database.

pub mod auth_codes;
pub mod categories;
pub mod credit_transactions;
pub mod favorites;
pub mod orders;
pub mod ratings;
pub mod resource_tags;
pub mod resource_unlocks;
pub mod resources;
pub mod tags;
pub mod users;
