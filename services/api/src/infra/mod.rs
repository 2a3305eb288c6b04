pub mod cache;
pub mod db;
pub mod email;
pub mod link_check;
pub mod llm;
pub mod payment;
