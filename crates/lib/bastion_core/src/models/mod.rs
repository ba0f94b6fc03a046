//! Domain models shared by the store adapter, the core services and the API.

pub mod audit;
pub mod auth;
pub mod menu;
pub mod permission;
