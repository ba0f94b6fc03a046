//! Audit trail of entity state transitions, and the error trail.
//!
//! [`AuditLogger`] snapshots entities before and after a mutation, strips
//! credential-like fields and appends one entry per call. It also records
//! server-side failures with the request they happened in. Neither trail
//! ever fails the caller: serialization and persistence errors are logged
//! and dropped, so delivery is best effort.

pub mod context;
pub mod queries;

use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

pub use context::RequestContext;

use crate::models::audit::{AuditAction, AuditLogEntry, ErrorLogEntry};
use crate::store::{AuditStore, ErrorLogStore, StoreResult};
use crate::uuid::uuidv7;

/// Top-level keys removed from every snapshot before it is stored.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "password_hash",
    "passwordHash",
    "token",
    "secret",
    "api_key",
    "apiKey",
    "private_key",
    "privateKey",
];

/// History page size when the caller asks for none.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Largest history page served.
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Remove [`SENSITIVE_FIELDS`] from a snapshot. Only object keys at the top
/// level are inspected.
pub fn redact(value: &mut Value) {
    if let Value::Object(map) = value {
        for field in SENSITIVE_FIELDS {
            map.remove(*field);
        }
    }
}

fn snapshot<T: Serialize + ?Sized>(data: &T) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(data)?;
    redact(&mut value);
    Ok(value)
}

/// Clamp a requested page size to `1..=MAX_HISTORY_LIMIT`, defaulting
/// non-positive values.
pub fn clamp_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_HISTORY_LIMIT
    } else {
        limit.min(MAX_HISTORY_LIMIT)
    }
}

/// Best-effort audit writer and history reader.
pub struct AuditLogger<S: AuditStore + ?Sized> {
    store: Arc<S>,
}

impl<S: AuditStore + ?Sized> Clone for AuditLogger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AuditStore + ?Sized> AuditLogger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record the creation of an entity.
    pub async fn log_create<T: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        entity_type: &str,
        entity_id: Uuid,
        new_data: &T,
    ) {
        let new = match snapshot(new_data) {
            Ok(v) => v,
            Err(e) => {
                error!(entity_type, %entity_id, error = %e, "failed to serialize audit snapshot");
                return;
            }
        };
        self.append(ctx, AuditAction::Create, entity_type, entity_id, None, Some(new))
            .await;
    }

    /// Record an update, with the state before and after.
    pub async fn log_update<T: Serialize + ?Sized, U: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        entity_type: &str,
        entity_id: Uuid,
        old_data: &T,
        new_data: &U,
    ) {
        let (old, new) = match (snapshot(old_data), snapshot(new_data)) {
            (Ok(old), Ok(new)) => (old, new),
            (Err(e), _) | (_, Err(e)) => {
                error!(entity_type, %entity_id, error = %e, "failed to serialize audit snapshot");
                return;
            }
        };
        self.append(
            ctx,
            AuditAction::Update,
            entity_type,
            entity_id,
            Some(old),
            Some(new),
        )
        .await;
    }

    /// Record the deletion of an entity, with its last state.
    pub async fn log_delete<T: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        entity_type: &str,
        entity_id: Uuid,
        old_data: &T,
    ) {
        let old = match snapshot(old_data) {
            Ok(v) => v,
            Err(e) => {
                error!(entity_type, %entity_id, error = %e, "failed to serialize audit snapshot");
                return;
            }
        };
        self.append(ctx, AuditAction::Delete, entity_type, entity_id, Some(old), None)
            .await;
    }

    async fn append(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        old_data: Option<Value>,
        new_data: Option<Value>,
    ) {
        let entry = AuditLogEntry {
            id: uuidv7(),
            action,
            entity_type: entity_type.to_string(),
            entity_id,
            actor_id: ctx.actor_id,
            old_data,
            new_data,
            request_id: ctx.request_id.clone(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: Utc::now(),
        };
        match self.store.insert_audit_log(&entry).await {
            Ok(()) => debug!(%action, entity_type, %entity_id, "audit entry recorded"),
            Err(e) => error!(
                %action,
                entity_type,
                %entity_id,
                error = %e,
                "failed to record audit entry"
            ),
        }
    }

    /// Entries for one entity, newest first.
    pub async fn entity_history(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        self.store
            .list_audit_logs_by_entity(entity_type, entity_id, clamp_limit(limit), offset.max(0))
            .await
    }

    /// Entries written by one actor, newest first.
    pub async fn actor_history(
        &self,
        actor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        self.store
            .list_audit_logs_by_actor(actor_id, clamp_limit(limit), offset.max(0))
            .await
    }
}

impl<S: AuditStore + ErrorLogStore + ?Sized> AuditLogger<S> {
    /// Record a server-side failure against the request in `ctx`.
    ///
    /// A stack trace is attached when backtraces are enabled
    /// (`RUST_BACKTRACE`). Like every other write here, failures to persist
    /// are logged and dropped.
    pub async fn log_error(
        &self,
        ctx: &RequestContext,
        error_type: &str,
        error_message: &str,
        metadata: Option<Value>,
    ) {
        let backtrace = Backtrace::capture();
        let stack_trace =
            (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string());
        let entry = ErrorLogEntry {
            id: uuidv7(),
            actor_id: ctx.actor_id,
            request_id: ctx.request_id.clone(),
            error_type: error_type.to_string(),
            error_message: error_message.to_string(),
            stack_trace,
            request_path: ctx.path.clone(),
            request_method: ctx.method.clone(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            metadata,
            created_at: Utc::now(),
        };
        match self.store.insert_error_log(&entry).await {
            Ok(()) => debug!(error_type, "error entry recorded"),
            Err(e) => error!(error_type, error = %e, "failed to record error entry"),
        }
    }

    /// Recent error entries, newest first, optionally of one type.
    pub async fn recent_errors(
        &self,
        error_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ErrorLogEntry>> {
        self.store
            .list_error_logs(error_type, clamp_limit(limit), offset.max(0))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::store::StoreError;

    #[derive(Default)]
    struct MemoryAudit {
        entries: Mutex<Vec<AuditLogEntry>>,
        errors: Mutex<Vec<ErrorLogEntry>>,
        fail: bool,
        last_limit: Mutex<Option<i64>>,
    }

    #[async_trait]
    impl ErrorLogStore for MemoryAudit {
        async fn insert_error_log(&self, entry: &ErrorLogEntry) -> StoreResult<()> {
            if self.fail {
                return Err(StoreError::Db(sqlx::Error::PoolTimedOut));
            }
            self.errors.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn list_error_logs(
            &self,
            error_type: Option<&str>,
            limit: i64,
            _offset: i64,
        ) -> StoreResult<Vec<ErrorLogEntry>> {
            *self.last_limit.lock().unwrap() = Some(limit);
            Ok(self
                .errors
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|e| error_type.is_none_or(|t| e.error_type == t))
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl AuditStore for MemoryAudit {
        async fn insert_audit_log(&self, entry: &AuditLogEntry) -> StoreResult<()> {
            if self.fail {
                return Err(StoreError::Db(sqlx::Error::PoolTimedOut));
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn list_audit_logs_by_entity(
            &self,
            entity_type: &str,
            entity_id: Uuid,
            limit: i64,
            _offset: i64,
        ) -> StoreResult<Vec<AuditLogEntry>> {
            *self.last_limit.lock().unwrap() = Some(limit);
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn list_audit_logs_by_actor(
            &self,
            actor_id: Uuid,
            limit: i64,
            _offset: i64,
        ) -> StoreResult<Vec<AuditLogEntry>> {
            *self.last_limit.lock().unwrap() = Some(limit);
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|e| e.actor_id == Some(actor_id))
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    fn ctx() -> RequestContext {
        RequestContext {
            actor_id: Some(Uuid::from_u128(7)),
            request_id: Some("req-1".into()),
            ip_address: Some("203.0.113.9".into()),
            user_agent: Some("curl/8".into()),
            method: Some("POST".into()),
            path: Some("/api/admin/v1/admins".into()),
        }
    }

    #[test]
    fn redact_strips_denylisted_top_level_keys() {
        let mut v = json!({
            "id": 1,
            "email": "a@b.c",
            "password_hash": "$2b$...",
            "apiKey": "k",
            "profile": { "token": "nested stays" }
        });
        redact(&mut v);
        assert_eq!(
            v,
            json!({ "id": 1, "email": "a@b.c", "profile": { "token": "nested stays" } })
        );
    }

    #[test]
    fn redact_ignores_non_objects() {
        let mut v = json!(["password"]);
        redact(&mut v);
        assert_eq!(v, json!(["password"]));
    }

    #[test]
    fn limit_clamping() {
        assert_eq!(clamp_limit(0), DEFAULT_HISTORY_LIMIT);
        assert_eq!(clamp_limit(-3), DEFAULT_HISTORY_LIMIT);
        assert_eq!(clamp_limit(10), 10);
        assert_eq!(clamp_limit(1000), MAX_HISTORY_LIMIT);
    }

    #[tokio::test]
    async fn create_update_delete_shapes() {
        let store = Arc::new(MemoryAudit::default());
        let logger = AuditLogger::new(Arc::clone(&store));
        let id = Uuid::from_u128(42);
        let before = json!({ "name": "old", "secret": "s" });
        let after = json!({ "name": "new", "secret": "s" });

        logger.log_create(&ctx(), "widgets", id, &after).await;
        logger.log_update(&ctx(), "widgets", id, &before, &after).await;
        logger.log_delete(&ctx(), "widgets", id, &after).await;

        let entries = store.entries.lock().unwrap().clone();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].action, AuditAction::Create);
        assert!(entries[0].old_data.is_none());
        assert_eq!(entries[0].new_data, Some(json!({ "name": "new" })));

        assert_eq!(entries[1].action, AuditAction::Update);
        assert_eq!(entries[1].old_data, Some(json!({ "name": "old" })));

        assert_eq!(entries[2].action, AuditAction::Delete);
        assert!(entries[2].new_data.is_none());

        for e in &entries {
            assert_eq!(e.actor_id, Some(Uuid::from_u128(7)));
            assert_eq!(e.request_id.as_deref(), Some("req-1"));
            assert_eq!(e.ip_address.as_deref(), Some("203.0.113.9"));
            assert_eq!(e.user_agent.as_deref(), Some("curl/8"));
        }
    }

    #[tokio::test]
    async fn created_user_snapshot_drops_password_hash() {
        let store = Arc::new(MemoryAudit::default());
        let logger = AuditLogger::new(Arc::clone(&store));
        let snapshot = json!({ "email": "a@b.com", "password_hash": "abc" });
        logger
            .log_create(&ctx(), "users", Uuid::from_u128(1), &snapshot)
            .await;
        let entries = store.entries.lock().unwrap();
        assert_eq!(entries[0].new_data, Some(json!({ "email": "a@b.com" })));
    }

    #[tokio::test]
    async fn store_failure_is_swallowed() {
        let store = Arc::new(MemoryAudit {
            fail: true,
            ..MemoryAudit::default()
        });
        let logger = AuditLogger::new(Arc::clone(&store));
        logger
            .log_delete(&ctx(), "admins", Uuid::nil(), &json!({ "id": 1 }))
            .await;
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_limits_are_clamped() {
        let store = Arc::new(MemoryAudit::default());
        let logger = AuditLogger::new(Arc::clone(&store));
        logger.entity_history("admins", Uuid::nil(), 0, 0).await.unwrap();
        assert_eq!(*store.last_limit.lock().unwrap(), Some(DEFAULT_HISTORY_LIMIT));
        logger.actor_history(Uuid::nil(), 500, 0).await.unwrap();
        assert_eq!(*store.last_limit.lock().unwrap(), Some(MAX_HISTORY_LIMIT));
    }

    #[tokio::test]
    async fn error_entries_carry_request_context() {
        let store = Arc::new(MemoryAudit::default());
        let logger = AuditLogger::new(Arc::clone(&store));
        logger
            .log_error(&ctx(), "db", "pool timed out", Some(json!({ "attempt": 2 })))
            .await;
        logger.log_error(&ctx(), "jwt", "encode failed", None).await;

        let errors = store.errors.lock().unwrap().clone();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].error_type, "db");
        assert_eq!(errors[0].error_message, "pool timed out");
        assert_eq!(errors[0].actor_id, Some(Uuid::from_u128(7)));
        assert_eq!(errors[0].request_id.as_deref(), Some("req-1"));
        assert_eq!(errors[0].request_method.as_deref(), Some("POST"));
        assert_eq!(errors[0].request_path.as_deref(), Some("/api/admin/v1/admins"));
        assert_eq!(errors[0].metadata, Some(json!({ "attempt": 2 })));

        let only_jwt = logger.recent_errors(Some("jwt"), 0, 0).await.unwrap();
        assert_eq!(only_jwt.len(), 1);
        assert_eq!(only_jwt[0].error_message, "encode failed");
        assert_eq!(*store.last_limit.lock().unwrap(), Some(DEFAULT_HISTORY_LIMIT));
    }

    #[tokio::test]
    async fn error_store_failure_is_swallowed() {
        let store = Arc::new(MemoryAudit {
            fail: true,
            ..MemoryAudit::default()
        });
        let logger = AuditLogger::new(Arc::clone(&store));
        logger.log_error(&RequestContext::default(), "db", "down", None).await;
        assert!(store.errors.lock().unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn snapshots_never_keep_sensitive_keys(
            keys in proptest::collection::vec(
                prop_oneof![
                    Just("password".to_string()),
                    Just("privateKey".to_string()),
                    Just("api_key".to_string()),
                    "[a-z_]{1,10}",
                ],
                0..12,
            )
        ) {
            let obj: serde_json::Map<String, Value> =
                keys.iter().map(|k| (k.clone(), json!("v"))).collect();
            let snap = snapshot(&Value::Object(obj)).unwrap();
            let map = snap.as_object().unwrap();
            for field in SENSITIVE_FIELDS {
                prop_assert!(!map.contains_key(*field));
            }
        }
    }
}
