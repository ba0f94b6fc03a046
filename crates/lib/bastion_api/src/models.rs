//! Request and response bodies.
//!
//! Principals are never serialized directly: the profile types below omit
//! the credential hash.

use bastion_core::models::audit::{AuditLogEntry, ErrorLogEntry};
use bastion_core::models::auth::{Admin, User};
use bastion_core::models::permission::Permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Success envelope: `{"status": true, "message": ..., "data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data,
        }
    }
}

/// Error body: `{"status": false, "error": <code>, "message": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: bool,
    pub error: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UserLoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin login. Older clients send the email in a `username` field.
#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub admin: AdminProfile,
}

// ---------------------------------------------------------------------------
// Principals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            username: u.username.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Admin> for AdminProfile {
    fn from(a: &Admin) -> Self {
        Self {
            id: a.id,
            email: a.email.clone(),
            username: a.username.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            role: a.role.clone(),
            is_active: a.is_active,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Admin management
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Partial update: absent or blank fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAdminRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdminStatusRequest {
    pub is_active: bool,
}

/// `?limit=&offset=` for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Permissions and audit
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct MyPermissionsResponse {
    pub role: String,
    pub permissions: Vec<Permission>,
}

/// `?type=&limit=&offset=` for the error trail.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorLogQuery {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorLogList {
    pub entries: Vec<ErrorLogEntry>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditLogList {
    pub entries: Vec<AuditLogEntry>,
    pub limit: i64,
    pub offset: i64,
}
