pub mod auth;
pub mod inventory;
