//! Authentication logic shared by the frontend and admin APIs.
//!
//! Provides password hashing and credential checks, the per-domain token
//! service, and the principal queries backing [`crate::store::PgStore`].

pub mod credentials;
pub mod jwt;
pub mod queries;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("not an admin token")]
    WrongDomain,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
