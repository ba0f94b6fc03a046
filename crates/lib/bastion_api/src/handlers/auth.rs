//! Login handlers for the frontend and admin APIs.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{
    AdminLoginRequest, AdminLoginResponse, ApiResponse, UserLoginRequest, UserLoginResponse,
};
use crate::services::auth;

/// `POST /api/v1/auth/login`: authenticate an end user with email + password.
pub async fn user_login_handler(
    State(state): State<AppState>,
    Json(body): Json<UserLoginRequest>,
) -> AppResult<Json<ApiResponse<UserLoginResponse>>> {
    let resp = auth::user_login(&state, &body.email, &body.password).await?;
    Ok(Json(ApiResponse::ok("login successful", resp)))
}

/// `POST /api/admin/v1/auth/login`: authenticate an admin.
pub async fn admin_login_handler(
    State(state): State<AppState>,
    Json(body): Json<AdminLoginRequest>,
) -> AppResult<Json<ApiResponse<AdminLoginResponse>>> {
    let resp = auth::admin_login(&state, &body.email, &body.password).await?;
    Ok(Json(ApiResponse::ok("login successful", resp)))
}
