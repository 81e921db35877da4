pub mod auth;
pub mod categories;
pub mod employees;
pub mod products;
