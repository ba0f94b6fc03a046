//! Admin management with audited mutations.
//!
//! Audit snapshots are the full `Admin` record; the logger strips the
//! credential hash before it is stored.

use bastion_core::audit::RequestContext;
use bastion_core::auth::credentials::hash_new_password;
use bastion_core::models::auth::{Admin, NewAdmin};
use bastion_core::store::StoreError;
use bastion_core::uuid::parse_id;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CreateAdminRequest, PageQuery, UpdateAdminRequest};

/// Entity type recorded in the audit trail.
pub const ENTITY_ADMINS: &str = "admins";

const DEFAULT_PAGE: i64 = 20;
const MAX_PAGE: i64 = 100;

/// Parse a path id, rejecting malformed input as a validation error.
pub fn parse_path_id(raw: &str) -> AppResult<Uuid> {
    parse_id(raw).ok_or_else(|| AppError::Validation(format!("invalid id: {raw}")))
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trimmed value of an optional field; blank counts as absent.
fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_email(email: &str) -> AppResult<()> {
    if !email.contains('@') {
        return Err(AppError::Validation("email is invalid".into()));
    }
    Ok(())
}

pub async fn list_admins(state: &AppState, page: &PageQuery) -> AppResult<Vec<Admin>> {
    let limit = page.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_PAGE).min(MAX_PAGE);
    let offset = page.offset.unwrap_or(0).max(0);
    Ok(state.store.list_admins(limit, offset).await?)
}

pub async fn get_admin(state: &AppState, id: Uuid) -> AppResult<Admin> {
    state.store.find_admin_by_id(id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("admin not found".into()),
        other => other.into(),
    })
}

pub async fn create_admin(
    state: &AppState,
    ctx: &RequestContext,
    req: CreateAdminRequest,
) -> AppResult<Admin> {
    let email = required("email", &req.email)?;
    check_email(&email)?;
    let new_admin = NewAdmin {
        email,
        username: required("username", &req.username)?,
        password_hash: hash_new_password(&req.password)?,
        first_name: req.first_name,
        last_name: req.last_name,
        role: required("role", &req.role)?,
    };

    let admin = state.store.create_admin(new_admin).await?;
    info!(admin_id = %admin.id, role = %admin.role, "admin created");
    state
        .audit()
        .log_create(ctx, ENTITY_ADMINS, admin.id, &admin)
        .await;
    Ok(admin)
}

/// Apply a partial update in one audited step.
pub async fn update_admin(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
    req: UpdateAdminRequest,
) -> AppResult<Admin> {
    let before = get_admin(state, id).await?;
    let mut next = before.clone();

    if let Some(email) = provided(req.email) {
        check_email(&email)?;
        next.email = email;
    }
    if let Some(username) = provided(req.username) {
        next.username = username;
    }
    if let Some(password) = req.password.filter(|p| !p.is_empty()) {
        next.password_hash = hash_new_password(&password)?;
    }
    if let Some(first_name) = provided(req.first_name) {
        next.first_name = Some(first_name);
    }
    if let Some(last_name) = provided(req.last_name) {
        next.last_name = Some(last_name);
    }
    if let Some(role) = provided(req.role) {
        next.role = role;
    }
    if let Some(is_active) = req.is_active {
        next.is_active = is_active;
    }

    let after = state.store.update_admin(&next).await?;
    info!(admin_id = %id, role = %after.role, "admin updated");
    state
        .audit()
        .log_update(ctx, ENTITY_ADMINS, id, &before, &after)
        .await;
    Ok(after)
}

pub async fn set_admin_status(
    state: &AppState,
    ctx: &RequestContext,
    id: Uuid,
    is_active: bool,
) -> AppResult<Admin> {
    let before = get_admin(state, id).await?;
    let after = state.store.set_admin_active(id, is_active).await?;
    info!(admin_id = %id, is_active, "admin status changed");
    state
        .audit()
        .log_update(ctx, ENTITY_ADMINS, id, &before, &after)
        .await;
    Ok(after)
}

/// Soft delete: the admin is deactivated and kept for the audit trail.
pub async fn delete_admin(state: &AppState, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
    let before = get_admin(state, id).await?;
    state.store.set_admin_active(id, false).await?;
    info!(admin_id = %id, "admin deleted");
    state
        .audit()
        .log_delete(ctx, ENTITY_ADMINS, id, &before)
        .await;
    Ok(())
}
