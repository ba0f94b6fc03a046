//! Authentication middleware: bearer extraction, token validation and a live
//! principal re-fetch, one variant per token domain.
//!
//! The re-fetch is the only guard against deleted or deactivated principals
//! still holding a valid token.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use bastion_core::audit::RequestContext;
use bastion_core::models::auth::{Admin, User};
use bastion_core::store::StoreError;
use bastion_core::uuid::parse_id;
use tracing::debug;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, INVALID_TOKEN};

/// Authenticated end user, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub id: String,
}

/// Authenticated admin, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    pub admin: Admin,
    pub id: String,
    /// Role as carried by the token claims.
    pub role: String,
}

/// Pull the token out of `Authorization: Bearer <token>`. Both `Bearer` and
/// `bearer` are accepted.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".into()))?;
    let invalid = || AppError::Unauthorized("invalid authorization header format".into());
    let value = header.to_str().map_err(|_| invalid())?;
    let (scheme, token) = value.split_once(' ').ok_or_else(invalid)?;
    let token = token.trim();
    if !matches!(scheme, "Bearer" | "bearer") || token.is_empty() {
        return Err(invalid());
    }
    Ok(token)
}

fn parse_subject(raw: &str) -> Result<Uuid, AppError> {
    parse_id(raw).ok_or_else(|| {
        debug!(subject = raw, "token subject is not a uuid");
        AppError::Unauthorized(INVALID_TOKEN.into())
    })
}

/// Attribute the request's [`RequestContext`] to the authenticated principal.
fn attach_actor(request: &mut Request, actor_id: Uuid) {
    let ctx = request
        .extensions_mut()
        .remove::<RequestContext>()
        .unwrap_or_default()
        .with_actor(actor_id);
    request.extensions_mut().insert(ctx);
}

/// Axum middleware for the frontend API.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers())?;
    let claims = state.user_tokens.validate(token).map_err(|e| {
        debug!(error = %e, "user token rejected");
        AppError::Unauthorized(INVALID_TOKEN.into())
    })?;
    let user_id = parse_subject(&claims.user_id)?;

    let user = match state.store.find_user_by_id(user_id).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AppError::Unauthorized("user not found".into())),
        Err(e) => return Err(AppError::Internal(format!("user lookup: {e}"))),
    };

    attach_actor(&mut request, user.id);
    request.extensions_mut().insert(AuthenticatedUser {
        user,
        id: claims.user_id,
    });
    Ok(next.run(request).await)
}

/// Axum middleware for the admin API. Deactivated admins are refused even
/// with an unexpired token.
pub async fn require_admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(request.headers())?;
    let claims = state.admin_tokens.validate(token).map_err(|e| {
        debug!(error = %e, "admin token rejected");
        AppError::Unauthorized(INVALID_TOKEN.into())
    })?;
    let admin_id = parse_subject(&claims.admin_id)?;

    let admin = match state.store.find_active_admin_by_id(admin_id).await {
        Ok(admin) => admin,
        Err(StoreError::NotFound) => return Err(AppError::Unauthorized("admin not found".into())),
        Err(StoreError::Inactive) => {
            debug!(%admin_id, "inactive admin presented a valid token");
            return Err(StoreError::Inactive.into());
        }
        Err(e) => return Err(AppError::Internal(format!("admin lookup: {e}"))),
    };

    attach_actor(&mut request, admin.id);
    request.extensions_mut().insert(AuthenticatedAdmin {
        admin,
        id: claims.admin_id,
        role: claims.role,
    });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Unauthorized(m) => m,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn accepts_both_scheme_spellings() {
        assert_eq!(extract_bearer(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn missing_header() {
        let err = extract_bearer(&HeaderMap::new()).unwrap_err();
        assert_eq!(message(err), "missing authorization header");
    }

    #[test]
    fn malformed_headers() {
        for value in ["Basic abc", "Bearer", "Bearer   ", "BEARER abc", "abc"] {
            let err = extract_bearer(&headers(value)).unwrap_err();
            assert_eq!(message(err), "invalid authorization header format", "{value}");
        }
    }
}
