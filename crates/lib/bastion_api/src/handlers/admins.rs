//! Admin management handlers. All routes are gated on `admins.manage`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use bastion_core::audit::RequestContext;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{
    AdminProfile, ApiResponse, CreateAdminRequest, PageQuery, UpdateAdminRequest,
    UpdateAdminStatusRequest,
};
use crate::services::admins::{self, parse_path_id};

/// `GET /api/admin/v1/admins`
pub async fn list_admins_handler(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<AdminProfile>>>> {
    let admins = admins::list_admins(&state, &page).await?;
    let profiles = admins.iter().map(AdminProfile::from).collect();
    Ok(Json(ApiResponse::ok("admins retrieved", profiles)))
}

/// `GET /api/admin/v1/admins/{id}`
pub async fn get_admin_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<AdminProfile>>> {
    let admin = admins::get_admin(&state, parse_path_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(
        "admin retrieved",
        AdminProfile::from(&admin),
    )))
}

/// `POST /api/admin/v1/admins`
pub async fn create_admin_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AdminProfile>>)> {
    let admin = admins::create_admin(&state, &ctx, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("admin created", AdminProfile::from(&admin))),
    ))
}

/// `PUT /api/admin/v1/admins/{id}`
pub async fn update_admin_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAdminRequest>,
) -> AppResult<Json<ApiResponse<AdminProfile>>> {
    let admin = admins::update_admin(&state, &ctx, parse_path_id(&id)?, body).await?;
    Ok(Json(ApiResponse::ok(
        "admin updated",
        AdminProfile::from(&admin),
    )))
}

/// `PATCH /api/admin/v1/admins/{id}/status`
pub async fn update_admin_status_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAdminStatusRequest>,
) -> AppResult<Json<ApiResponse<AdminProfile>>> {
    let admin =
        admins::set_admin_status(&state, &ctx, parse_path_id(&id)?, body.is_active).await?;
    Ok(Json(ApiResponse::ok(
        "admin status updated",
        AdminProfile::from(&admin),
    )))
}

/// `DELETE /api/admin/v1/admins/{id}`: soft delete, super admins only.
pub async fn delete_admin_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    admins::delete_admin(&state, &ctx, parse_path_id(&id)?).await?;
    Ok(Json(ApiResponse::ok("admin deleted", ())))
}
