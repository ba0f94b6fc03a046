//! Principal and token-claims domain models.
//!
//! `User` and `Admin` are separate types on purpose: a value of one can never
//! be handed to code expecting the other. Both serialize their credential
//! hash so that audit snapshots see the full record; the audit logger strips
//! it before persistence, and HTTP responses use dedicated DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed `sub` value carried by every admin token.
pub const ADMIN_SUBJECT: &str = "admin";

/// End-user principal (frontend API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Back-office principal (admin API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Free-form role label, mapped to permissions via `role_permissions`.
    pub role: String,
    /// Inactive admins can neither log in nor use a previously issued token.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new admin. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
}

/// Claims embedded in user-domain tokens. Carries no `sub` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: String,
    pub email: String,
    pub username: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Not before (unix timestamp).
    pub nbf: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Claims embedded in admin-domain tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub admin_id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    /// Always [`ADMIN_SUBJECT`].
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Validity window shared by both claim shapes.
pub trait TimeBound {
    fn not_before(&self) -> i64;
    fn expires_at(&self) -> i64;
}

impl TimeBound for UserClaims {
    fn not_before(&self) -> i64 {
        self.nbf
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl TimeBound for AdminClaims {
    fn not_before(&self) -> i64 {
        self.nbf
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}
