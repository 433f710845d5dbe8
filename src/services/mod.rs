pub mod auth;
pub mod cache;
pub mod cookies;
pub mod session;
