pub mod asset_store;
pub mod auth;
pub mod inventory_service;
pub mod password;
pub mod token;
