//! Audit and error trail handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use bastion_core::audit::clamp_limit;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{ApiResponse, AuditLogList, ErrorLogList, ErrorLogQuery, PageQuery};
use crate::services::admins::parse_path_id;

/// `GET /api/admin/v1/audit-logs/entities/{entity_type}/{entity_id}`
pub async fn entity_history_handler(
    State(state): State<AppState>,
    Path((entity_type, entity_id)): Path<(String, String)>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<AuditLogList>>> {
    let entity_id = parse_path_id(&entity_id)?;
    let limit = clamp_limit(page.limit.unwrap_or(0));
    let offset = page.offset.unwrap_or(0).max(0);
    let entries = state
        .audit()
        .entity_history(&entity_type, entity_id, limit, offset)
        .await?;
    Ok(Json(ApiResponse::ok(
        "audit history retrieved",
        AuditLogList {
            entries,
            limit,
            offset,
        },
    )))
}

/// `GET /api/admin/v1/audit-logs/actors/{actor_id}`
pub async fn actor_history_handler(
    State(state): State<AppState>,
    Path(actor_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<AuditLogList>>> {
    let actor_id = parse_path_id(&actor_id)?;
    let limit = clamp_limit(page.limit.unwrap_or(0));
    let offset = page.offset.unwrap_or(0).max(0);
    let entries = state.audit().actor_history(actor_id, limit, offset).await?;
    Ok(Json(ApiResponse::ok(
        "audit history retrieved",
        AuditLogList {
            entries,
            limit,
            offset,
        },
    )))
}

/// `GET /api/admin/v1/error-logs?type=`
pub async fn error_logs_handler(
    State(state): State<AppState>,
    Query(query): Query<ErrorLogQuery>,
) -> AppResult<Json<ApiResponse<ErrorLogList>>> {
    let limit = clamp_limit(query.limit.unwrap_or(0));
    let offset = query.offset.unwrap_or(0).max(0);
    let entries = state
        .audit()
        .recent_errors(query.error_type.as_deref(), limit, offset)
        .await?;
    Ok(Json(ApiResponse::ok(
        "error logs retrieved",
        ErrorLogList {
            entries,
            limit,
            offset,
        },
    )))
}
