//! Business logic behind the handlers.

pub mod admins;
pub mod auth;
