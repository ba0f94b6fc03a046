//! "Who am I" handlers.

use axum::{Extension, Json};

use crate::middleware::auth::{AuthenticatedAdmin, AuthenticatedUser};
use crate::models::{AdminProfile, ApiResponse, UserProfile};

/// `GET /api/v1/me`
pub async fn user_me_handler(
    Extension(auth): Extension<AuthenticatedUser>,
) -> Json<ApiResponse<UserProfile>> {
    Json(ApiResponse::ok(
        "user retrieved",
        UserProfile::from(&auth.user),
    ))
}

/// `GET /api/admin/v1/me`
pub async fn admin_me_handler(
    Extension(auth): Extension<AuthenticatedAdmin>,
) -> Json<ApiResponse<AdminProfile>> {
    Json(ApiResponse::ok(
        "admin retrieved",
        AdminProfile::from(&auth.admin),
    ))
}
