//! Admin menu handler.

use axum::extract::State;
use axum::{Extension, Json};
use bastion_core::menu::build_menu;
use bastion_core::models::menu::MenuNode;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedAdmin;
use crate::models::ApiResponse;

/// `GET /api/admin/v1/menu`: the menu forest visible to the caller's role.
pub async fn menu_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedAdmin>,
) -> AppResult<Json<ApiResponse<Vec<MenuNode>>>> {
    let menu = build_menu(state.store.as_ref(), &auth.role).await?;
    Ok(Json(ApiResponse::ok("menu retrieved", menu)))
}
