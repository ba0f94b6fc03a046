//! # bastion_core
//!
//! Core domain logic for Bastion: per-domain token services, role permission
//! resolution, admin menu materialization and the audit trail.
//!
//! Storage is consumed through the traits in [`store`]; [`store::PgStore`]
//! is the PostgreSQL implementation.

pub mod audit;
pub mod auth;
pub mod menu;
pub mod migrate;
pub mod models;
pub mod permissions;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
