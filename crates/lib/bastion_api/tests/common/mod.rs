//! Shared fixtures: an in-memory store and request helpers.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use bastion_api::config::ApiConfig;
use bastion_api::{AppState, router};
use bastion_core::models::audit::{AuditLogEntry, ErrorLogEntry};
use bastion_core::models::auth::{Admin, NewAdmin, User};
use bastion_core::models::menu::MenuRow;
use bastion_core::models::permission::Permission;
use bastion_core::store::{
    AuditStore, ErrorLogStore, MenuStore, PermissionStore, PrincipalStore, StoreError,
    StoreResult,
};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct-horse-battery";

fn backend_down() -> StoreError {
    StoreError::Db(sqlx::Error::PoolTimedOut)
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<Vec<User>>,
    pub admins: Mutex<Vec<Admin>>,
    pub grants: Mutex<HashMap<String, Vec<Permission>>>,
    pub menu: Mutex<Vec<MenuRow>>,
    pub audit: Mutex<Vec<AuditLogEntry>>,
    pub errors: Mutex<Vec<ErrorLogEntry>>,
    pub fail_audit_writes: AtomicBool,
    pub fail_permission_lookups: AtomicBool,
}

impl MemoryStore {
    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn add_admin(&self, admin: Admin) {
        self.admins.lock().unwrap().push(admin);
    }

    pub fn grant(&self, role: &str, codes: &[&str]) {
        let mut grants = self.grants.lock().unwrap();
        let held = grants.entry(role.to_string()).or_default();
        for code in codes {
            held.push(Permission {
                id: Uuid::new_v4(),
                code: code.to_string(),
                name: code.to_string(),
                category: code.split('.').next().unwrap_or_default().to_string(),
            });
        }
    }

    pub fn add_menu_row(&self, row: MenuRow) {
        self.menu.lock().unwrap().push(row);
    }

    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.audit.lock().unwrap().clone()
    }

    pub fn error_entries(&self) -> Vec<ErrorLogEntry> {
        self.errors.lock().unwrap().clone()
    }

    fn admin_where(&self, pred: impl Fn(&Admin) -> bool) -> StoreResult<Admin> {
        self.admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| pred(a))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn user_where(&self, pred: impl Fn(&User) -> bool) -> StoreResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| pred(u))
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<User> {
        self.user_where(|u| u.id == id)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        self.user_where(|u| u.email.eq_ignore_ascii_case(email))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<User> {
        self.user_where(|u| u.username == username)
    }

    async fn find_admin_by_id(&self, id: Uuid) -> StoreResult<Admin> {
        self.admin_where(|a| a.id == id)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Admin> {
        self.admin_where(|a| a.email.eq_ignore_ascii_case(email))
    }

    async fn find_admin_by_username(&self, username: &str) -> StoreResult<Admin> {
        self.admin_where(|a| a.username == username)
    }

    async fn list_admins(&self, limit: i64, offset: i64) -> StoreResult<Vec<Admin>> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_admin(&self, new_admin: NewAdmin) -> StoreResult<Admin> {
        let mut admins = self.admins.lock().unwrap();
        if admins.iter().any(|a| {
            a.email.eq_ignore_ascii_case(&new_admin.email) || a.username == new_admin.username
        }) {
            return Err(StoreError::Conflict("admin already exists".into()));
        }
        let now = Utc::now();
        let admin = Admin {
            id: Uuid::now_v7(),
            email: new_admin.email,
            username: new_admin.username,
            password_hash: new_admin.password_hash,
            first_name: new_admin.first_name,
            last_name: new_admin.last_name,
            role: new_admin.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn set_admin_active(&self, id: Uuid, is_active: bool) -> StoreResult<Admin> {
        let mut admins = self.admins.lock().unwrap();
        let admin = admins
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;
        admin.is_active = is_active;
        admin.updated_at = Utc::now();
        Ok(admin.clone())
    }

    async fn update_admin(&self, update: &Admin) -> StoreResult<Admin> {
        let mut admins = self.admins.lock().unwrap();
        if admins.iter().any(|a| {
            a.id != update.id
                && (a.email.eq_ignore_ascii_case(&update.email) || a.username == update.username)
        }) {
            return Err(StoreError::Conflict("admin already exists".into()));
        }
        let admin = admins
            .iter_mut()
            .find(|a| a.id == update.id)
            .ok_or(StoreError::NotFound)?;
        *admin = Admin {
            created_at: admin.created_at,
            updated_at: Utc::now(),
            ..update.clone()
        };
        Ok(admin.clone())
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn role_permission_codes(&self, role: &str) -> StoreResult<HashSet<String>> {
        if self.fail_permission_lookups.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        Ok(self
            .grants
            .lock()
            .unwrap()
            .get(role)
            .map(|perms| perms.iter().map(|p| p.code.clone()).collect())
            .unwrap_or_default())
    }

    async fn role_permissions(&self, role: &str) -> StoreResult<Vec<Permission>> {
        if self.fail_permission_lookups.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        Ok(self
            .grants
            .lock()
            .unwrap()
            .get(role)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn menu_rows_visible_to_role(&self, role: &str) -> StoreResult<Vec<MenuRow>> {
        let held = self.role_permission_codes(role).await?;
        let mut rows: Vec<MenuRow> = self
            .menu
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.required_permission
                    .as_ref()
                    .is_none_or(|code| held.contains(code))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.order_index, &a.code).cmp(&(b.order_index, &b.code)));
        Ok(rows)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn insert_audit_log(&self, entry: &AuditLogEntry) -> StoreResult<()> {
        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        self.audit.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_audit_logs_by_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        Ok(self
            .audit
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_audit_logs_by_actor(
        &self,
        actor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        Ok(self
            .audit
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| e.actor_id == Some(actor_id))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ErrorLogStore for MemoryStore {
    async fn insert_error_log(&self, entry: &ErrorLogEntry) -> StoreResult<()> {
        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(backend_down());
        }
        self.errors.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_error_logs(
        &self,
        error_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ErrorLogEntry>> {
        Ok(self
            .errors
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| error_type.is_none_or(|t| e.error_type == t))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Both domains share one secret, so cross-domain replay reaches the
/// discriminator check.
pub fn test_config() -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "postgres://unused".into(),
        jwt_secret: SECRET.into(),
        admin_jwt_secret: SECRET.into(),
        user_token_ttl: chrono::Duration::hours(168),
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(store.clone(), test_config());
        let router = router(state.clone());
        Self {
            store,
            state,
            router,
        }
    }

    pub fn admin_token(&self, admin: &Admin) -> String {
        self.state.admin_tokens.issue(admin).unwrap()
    }

    pub fn user_token(&self, user: &User) -> String {
        self.state.user_tokens.issue(user).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = self.send(request).await;
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn password_hash() -> String {
    bcrypt::hash(PASSWORD, 4).unwrap()
}

pub fn user(email: &str, username: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.into(),
        username: username.into(),
        password_hash: password_hash(),
        first_name: Some("Test".into()),
        last_name: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn admin(username: &str, role: &str) -> Admin {
    let now = Utc::now();
    Admin {
        id: Uuid::new_v4(),
        email: format!("{username}@admin.example.com"),
        username: username.into(),
        password_hash: password_hash(),
        first_name: None,
        last_name: None,
        role: role.into(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn menu_row(code: &str, parent: Option<Uuid>, required: Option<&str>, order: i32) -> MenuRow {
    MenuRow {
        id: Uuid::new_v4(),
        parent_id: parent,
        code: code.into(),
        label: code.into(),
        icon: None,
        path: Some(format!("/{code}")),
        required_permission: required.map(str::to_string),
        order_index: order,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token)
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
