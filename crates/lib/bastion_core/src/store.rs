//! Repository interfaces consumed by the core, and the PostgreSQL adapter.
//!
//! Every component that touches persistence does so through one of the
//! traits below, so the token, permission, menu and audit logic can be driven
//! by an in-memory store in tests. [`PgStore`] is the production adapter; its
//! methods delegate to the per-module `queries` functions.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::audit::{AuditLogEntry, ErrorLogEntry};
use crate::models::auth::{Admin, NewAdmin, User};
use crate::models::menu::MenuRow;
use crate::models::permission::Permission;
use crate::{audit, auth, menu, permissions};

/// Store errors. `NotFound` is always distinguishable from a backend failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("account is inactive")]
    Inactive,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Db(#[source] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            other => Self::Db(other),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Lookup and lifecycle of user and admin principals.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<User>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<User>;

    async fn find_admin_by_id(&self, id: Uuid) -> StoreResult<Admin>;
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Admin>;
    async fn find_admin_by_username(&self, username: &str) -> StoreResult<Admin>;

    /// Like [`find_admin_by_id`](Self::find_admin_by_id) but fails with
    /// [`StoreError::Inactive`] for deactivated admins.
    async fn find_active_admin_by_id(&self, id: Uuid) -> StoreResult<Admin> {
        let admin = self.find_admin_by_id(id).await?;
        if !admin.is_active {
            return Err(StoreError::Inactive);
        }
        Ok(admin)
    }

    async fn list_admins(&self, limit: i64, offset: i64) -> StoreResult<Vec<Admin>>;
    async fn create_admin(&self, new_admin: NewAdmin) -> StoreResult<Admin>;
    async fn set_admin_active(&self, id: Uuid, is_active: bool) -> StoreResult<Admin>;

    /// Persist every mutable field of `admin` (matched by id) and return the
    /// stored record.
    async fn update_admin(&self, admin: &Admin) -> StoreResult<Admin>;
}

/// Role to permission resolution.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Permission codes granted to `role`. Unknown roles yield an empty set.
    async fn role_permission_codes(&self, role: &str) -> StoreResult<HashSet<String>>;

    /// Full permission records granted to `role`, ordered by category and code.
    async fn role_permissions(&self, role: &str) -> StoreResult<Vec<Permission>>;
}

/// Menu rows filtered by role visibility.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Active rows whose required permission is unset or held by `role`,
    /// ordered by `order_index`.
    async fn menu_rows_visible_to_role(&self, role: &str) -> StoreResult<Vec<MenuRow>>;
}

/// Append-only audit trail persistence.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_audit_log(&self, entry: &AuditLogEntry) -> StoreResult<()>;

    /// Newest first.
    async fn list_audit_logs_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>>;

    /// Newest first.
    async fn list_audit_logs_by_actor(
        &self,
        actor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>>;
}

/// Append-only trail of server-side failures.
#[async_trait]
pub trait ErrorLogStore: Send + Sync {
    async fn insert_error_log(&self, entry: &ErrorLogEntry) -> StoreResult<()>;

    /// Newest first, optionally restricted to one `error_type`.
    async fn list_error_logs(
        &self,
        error_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ErrorLogEntry>>;
}

/// Everything the HTTP layer needs from persistence.
pub trait Store:
    PrincipalStore + PermissionStore + MenuStore + AuditStore + ErrorLogStore
{
}

impl<T> Store for T where
    T: PrincipalStore + PermissionStore + MenuStore + AuditStore + ErrorLogStore
{
}

// ---------------------------------------------------------------------------
// PostgreSQL adapter
// ---------------------------------------------------------------------------

/// [`Store`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<User> {
        auth::queries::find_user_by_id(&self.pool, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        auth::queries::find_user_by_email(&self.pool, email).await
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<User> {
        auth::queries::find_user_by_username(&self.pool, username).await
    }

    async fn find_admin_by_id(&self, id: Uuid) -> StoreResult<Admin> {
        auth::queries::find_admin_by_id(&self.pool, id).await
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Admin> {
        auth::queries::find_admin_by_email(&self.pool, email).await
    }

    async fn find_admin_by_username(&self, username: &str) -> StoreResult<Admin> {
        auth::queries::find_admin_by_username(&self.pool, username).await
    }

    async fn list_admins(&self, limit: i64, offset: i64) -> StoreResult<Vec<Admin>> {
        auth::queries::list_admins(&self.pool, limit, offset).await
    }

    async fn create_admin(&self, new_admin: NewAdmin) -> StoreResult<Admin> {
        auth::queries::create_admin(&self.pool, &new_admin).await
    }

    async fn set_admin_active(&self, id: Uuid, is_active: bool) -> StoreResult<Admin> {
        auth::queries::set_admin_active(&self.pool, id, is_active).await
    }

    async fn update_admin(&self, admin: &Admin) -> StoreResult<Admin> {
        auth::queries::update_admin(&self.pool, admin).await
    }
}

#[async_trait]
impl PermissionStore for PgStore {
    async fn role_permission_codes(&self, role: &str) -> StoreResult<HashSet<String>> {
        permissions::queries::role_permission_codes(&self.pool, role).await
    }

    async fn role_permissions(&self, role: &str) -> StoreResult<Vec<Permission>> {
        permissions::queries::role_permissions(&self.pool, role).await
    }
}

#[async_trait]
impl MenuStore for PgStore {
    async fn menu_rows_visible_to_role(&self, role: &str) -> StoreResult<Vec<MenuRow>> {
        menu::queries::menu_rows_visible_to_role(&self.pool, role).await
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn insert_audit_log(&self, entry: &AuditLogEntry) -> StoreResult<()> {
        audit::queries::insert_audit_log(&self.pool, entry).await
    }

    async fn list_audit_logs_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        audit::queries::list_by_entity(&self.pool, entity_type, entity_id, limit, offset).await
    }

    async fn list_audit_logs_by_actor(
        &self,
        actor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        audit::queries::list_by_actor(&self.pool, actor_id, limit, offset).await
    }
}

#[async_trait]
impl ErrorLogStore for PgStore {
    async fn insert_error_log(&self, entry: &ErrorLogEntry) -> StoreResult<()> {
        audit::queries::insert_error_log(&self.pool, entry).await
    }

    async fn list_error_logs(
        &self,
        error_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ErrorLogEntry>> {
        audit::queries::list_error_logs(&self.pool, error_type, limit, offset).await
    }
}
