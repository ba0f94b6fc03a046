//! Records 500 responses in the error trail.
//!
//! Mounted inside the authentication layer so entries carry the actor.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use bastion_core::audit::RequestContext;

use crate::AppState;
use crate::error::ServerErrorDetail;

/// Axum middleware appending one error entry per failed request.
pub async fn record_server_errors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();
    let response = next.run(request).await;
    if let Some(detail) = response.extensions().get::<ServerErrorDetail>() {
        state
            .audit()
            .log_error(&ctx, detail.error_type, &detail.message, None)
            .await;
    }
    response
}
