pub mod admin;
pub mod auth;
pub mod batch;
pub mod category;
pub mod credit;
pub mod favorite;
pub mod order;
pub mod rating;
pub mod resource;
pub mod tag;
pub mod user;
