//! Request handlers.

pub mod admins;
pub mod audit_logs;
pub mod auth;
pub mod me;
pub mod menu;
pub mod permissions;
