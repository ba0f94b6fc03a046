//! Permission and role gates for admin routes.
//!
//! Both run after [`require_admin_auth`](super::auth::require_admin_auth).
//! The permission gate resolves the caller's role once per request and any
//! store failure denies. The role gate is a plain allow-list on the role
//! carried by the token.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use bastion_core::permissions::{Requirement, resolve_role_permissions};
use bastion_core::store::Store;
use tracing::{debug, error, warn};

use super::auth::AuthenticatedAdmin;
use crate::error::AppError;

/// State for one gated route: the store and what the route requires.
#[derive(Clone)]
pub struct PermissionGate {
    store: Arc<dyn Store>,
    requirement: Arc<Requirement>,
}

impl PermissionGate {
    pub fn new(store: Arc<dyn Store>, requirement: Requirement) -> Self {
        Self {
            store,
            requirement: Arc::new(requirement),
        }
    }
}

/// Axum middleware enforcing the gate's [`Requirement`].
pub async fn enforce_permission(
    State(gate): State<PermissionGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let role = request
        .extensions()
        .get::<AuthenticatedAdmin>()
        .map(|a| a.role.clone())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::Unauthorized("admin role not found in context".into()))?;

    let held = resolve_role_permissions(gate.store.as_ref(), &role)
        .await
        .map_err(|e| {
            error!(%role, error = %e, "permission lookup failed");
            AppError::ServerError("failed to check permissions".into())
        })?;

    if held.is_empty() {
        debug!(%role, "role holds no permissions");
    }
    if !gate.requirement.is_satisfied_by(&held) {
        warn!(%role, requirement = %gate.requirement, "permission denied");
        return Err(AppError::Forbidden(
            "insufficient permissions for this action".into(),
        ));
    }

    Ok(next.run(request).await)
}

/// Allow-list of admin roles for one route.
#[derive(Clone)]
pub struct RoleGate {
    allowed: Arc<[String]>,
}

impl RoleGate {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, role: &str) -> bool {
        self.allowed.iter().any(|r| r == role)
    }
}

/// Axum middleware admitting only the gate's roles.
pub async fn enforce_role(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let role = request
        .extensions()
        .get::<AuthenticatedAdmin>()
        .map(|a| a.role.as_str())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::Forbidden("admin role not found in context".into()))?;

    if !gate.allows(role) {
        warn!(%role, allowed = ?gate.allowed, "role denied");
        return Err(AppError::Forbidden(
            "insufficient privileges: required role not found".into(),
        ));
    }

    Ok(next.run(request).await)
}
