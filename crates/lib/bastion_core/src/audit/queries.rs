//! Audit log queries backing [`crate::store::PgStore`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::audit::{AuditLogEntry, ErrorLogEntry};
use crate::store::{StoreError, StoreResult};

const AUDIT_COLUMNS: &str = "id, action, entity_type, entity_id, actor_id, old_data, new_data, \
     request_id, ip_address, user_agent, created_at";

/// Raw row; `action` is stored as text.
#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    action: String,
    entity_type: String,
    entity_id: Uuid,
    actor_id: Option<Uuid>,
    old_data: Option<serde_json::Value>,
    new_data: Option<serde_json::Value>,
    request_id: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = StoreError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            action: row.action.parse().map_err(StoreError::Corrupt)?,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            actor_id: row.actor_id,
            old_data: row.old_data,
            new_data: row.new_data,
            request_id: row.request_id,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        })
    }
}

/// Append one entry.
pub async fn insert_audit_log(pool: &PgPool, entry: &AuditLogEntry) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO audit_logs \
         (id, action, entity_type, entity_id, actor_id, old_data, new_data, \
          request_id, ip_address, user_agent, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(entry.id)
    .bind(entry.action.as_str())
    .bind(&entry.entity_type)
    .bind(entry.entity_id)
    .bind(entry.actor_id)
    .bind(&entry.old_data)
    .bind(&entry.new_data)
    .bind(&entry.request_id)
    .bind(&entry.ip_address)
    .bind(&entry.user_agent)
    .bind(entry.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Entries for one entity, newest first.
pub async fn list_by_entity(
    pool: &PgPool,
    entity_type: &str,
    entity_id: Uuid,
    limit: i64,
    offset: i64,
) -> StoreResult<Vec<AuditLogEntry>> {
    let sql = format!(
        "SELECT {AUDIT_COLUMNS} FROM audit_logs \
         WHERE entity_type = $1 AND entity_id = $2 \
         ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
    );
    let rows = sqlx::query_as::<_, AuditLogRow>(&sql)
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(AuditLogEntry::try_from).collect()
}

/// Entries written by one actor, newest first.
pub async fn list_by_actor(
    pool: &PgPool,
    actor_id: Uuid,
    limit: i64,
    offset: i64,
) -> StoreResult<Vec<AuditLogEntry>> {
    let sql = format!(
        "SELECT {AUDIT_COLUMNS} FROM audit_logs \
         WHERE actor_id = $1 \
         ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
    );
    let rows = sqlx::query_as::<_, AuditLogRow>(&sql)
        .bind(actor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(AuditLogEntry::try_from).collect()
}

const ERROR_COLUMNS: &str = "id, actor_id, request_id, error_type, error_message, stack_trace, \
     request_path, request_method, ip_address, user_agent, metadata, created_at";

/// Append one error entry.
pub async fn insert_error_log(pool: &PgPool, entry: &ErrorLogEntry) -> StoreResult<()> {
    let sql = format!(
        "INSERT INTO error_logs ({ERROR_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
    );
    sqlx::query(&sql)
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(&entry.request_id)
        .bind(&entry.error_type)
        .bind(&entry.error_message)
        .bind(&entry.stack_trace)
        .bind(&entry.request_path)
        .bind(&entry.request_method)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

/// Recent error entries, newest first. `error_type = None` lists every type.
pub async fn list_error_logs(
    pool: &PgPool,
    error_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> StoreResult<Vec<ErrorLogEntry>> {
    let sql = format!(
        "SELECT {ERROR_COLUMNS} FROM error_logs \
         WHERE $1::text IS NULL OR error_type = $1 \
         ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
    );
    let entries = sqlx::query_as::<_, ErrorLogEntry>(&sql)
        .bind(error_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(entries)
}
