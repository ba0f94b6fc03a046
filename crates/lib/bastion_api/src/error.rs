//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bastion_core::auth::AuthError;
use bastion_core::store::StoreError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Uniform message for every rejected credential pair.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Uniform message for every rejected token.
pub const INVALID_TOKEN: &str = "invalid or expired token";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Server-side failure detail attached to 500 responses, picked up by
/// [`record_server_errors`](crate::middleware::error_trail::record_server_errors).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerErrorDetail {
    pub error_type: &'static str,
    pub message: String,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Server-side failure with a message safe to return.
    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::ServerError(m) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "server_error", m.as_str())
            }
            AppError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let detail = match &self {
            AppError::ServerError(m) | AppError::Internal(m) => Some(ServerErrorDetail {
                error_type: error,
                message: m.clone(),
            }),
            _ => None,
        };
        let body = Json(ErrorResponse {
            status: false,
            error: error.to_string(),
            message: message.to_string(),
        });
        let mut response = (status, body).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::NotFound("resource not found".into()),
            StoreError::Inactive => AppError::Unauthorized("admin account is disabled".into()),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Db(_) | StoreError::Corrupt(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthorized(INVALID_CREDENTIALS.into()),
            AuthError::InvalidToken(_) | AuthError::WrongDomain => {
                AppError::Unauthorized(INVALID_TOKEN.into())
            }
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::Store(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_errors_hide_detail() {
        let resp = AppError::Internal("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["status"], false);
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn only_server_failures_carry_detail() {
        let resp = AppError::Internal("connection refused".into()).into_response();
        assert_eq!(
            resp.extensions().get::<ServerErrorDetail>(),
            Some(&ServerErrorDetail {
                error_type: "internal_error",
                message: "connection refused".into(),
            })
        );
        let resp = AppError::Forbidden("no".into()).into_response();
        assert!(resp.extensions().get::<ServerErrorDetail>().is_none());
    }

    #[test]
    fn store_errors_map_to_statuses() {
        assert!(matches!(
            AppError::from(StoreError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Conflict("dup".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Db(sqlx::Error::PoolTimedOut)),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn token_failures_share_one_message() {
        for err in [AuthError::WrongDomain, AuthError::InvalidToken("expired".into())] {
            match AppError::from(err) {
                AppError::Unauthorized(m) => assert_eq!(m, INVALID_TOKEN),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
