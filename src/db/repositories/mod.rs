pub mod cache;
pub mod document;
pub mod user;
