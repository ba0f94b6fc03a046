//! Caller permission listing.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedAdmin;
use crate::models::{ApiResponse, MyPermissionsResponse};

/// `GET /api/admin/v1/permissions`: permissions held by the caller's role.
pub async fn my_permissions_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAdmin>,
) -> AppResult<Json<ApiResponse<MyPermissionsResponse>>> {
    let permissions = state.store.role_permissions(&auth.role).await?;
    Ok(Json(ApiResponse::ok(
        "permissions retrieved",
        MyPermissionsResponse {
            role: auth.role,
            permissions,
        },
    )))
}
