//! Request middleware: context capture, authentication, permission and role
//! gates, and the error trail.

pub mod auth;
pub mod error_trail;
pub mod permissions;
pub mod request_context;
