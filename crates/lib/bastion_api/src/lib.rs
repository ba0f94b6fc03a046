//! # bastion_api
//!
//! HTTP API library for Bastion: the frontend (`/api/v1`) and admin
//! (`/api/admin/v1`) surfaces over `bastion_core`.
//!
//! Layering, outermost first: CORS, request tracing, request context, then
//! per-domain authentication, then the error trail, then the permission and
//! role gates on admin routes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use bastion_core::audit::AuditLogger;
use bastion_core::auth::jwt::{AdminTokenService, UserTokenService};
use bastion_core::permissions::Requirement;
use bastion_core::store::Store;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{admins, audit_logs, auth, me, menu, permissions};
use crate::middleware::error_trail::record_server_errors;
use crate::middleware::permissions::{
    PermissionGate, RoleGate, enforce_permission, enforce_role,
};
use crate::routes::{perms, roles};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for principals, permissions, menus and the audit trail.
    pub store: Arc<dyn Store>,
    /// API configuration.
    pub config: ApiConfig,
    pub user_tokens: UserTokenService,
    pub admin_tokens: AdminTokenService,
}

impl AppState {
    /// Build the state, deriving both token services from `config`.
    pub fn new(store: Arc<dyn Store>, config: ApiConfig) -> Self {
        let user_tokens =
            UserTokenService::new(config.jwt_secret.as_bytes(), config.user_token_ttl);
        let admin_tokens = AdminTokenService::new(config.admin_jwt_secret.as_bytes());
        Self {
            store,
            config,
            user_tokens,
            admin_tokens,
        }
    }

    pub fn audit(&self) -> AuditLogger<dyn Store> {
        AuditLogger::new(Arc::clone(&self.store))
    }
}

/// Run embedded database migrations.
///
/// Delegates to `bastion_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    bastion_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let store = Arc::clone(&state.store);
    let gate = move |requirement: Requirement| {
        from_fn_with_state(
            PermissionGate::new(Arc::clone(&store), requirement),
            enforce_permission,
        )
    };
    let role_gate = |allowed: &[&str]| {
        from_fn_with_state(RoleGate::new(allowed.iter().copied()), enforce_role)
    };
    let error_trail = || from_fn_with_state(state.clone(), record_server_errors);

    // Frontend API
    let frontend_public = Router::new()
        .route(routes::POST_USER_LOGIN, post(auth::user_login_handler))
        .route_layer(error_trail());

    let frontend_protected = Router::new()
        .route(routes::GET_USER_ME, get(me::user_me_handler))
        .route_layer(error_trail())
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_auth,
        ));

    // Admin API
    let admin_public = Router::new()
        .route(routes::POST_ADMIN_LOGIN, post(auth::admin_login_handler))
        .route_layer(error_trail());

    let admin_protected = Router::new()
        .route(routes::GET_ADMIN_ME, get(me::admin_me_handler))
        .route(routes::GET_ADMIN_MENU, get(menu::menu_handler))
        .route(
            routes::GET_ADMIN_PERMISSIONS,
            get(permissions::my_permissions_handler).route_layer(gate(Requirement::any([
                perms::PERMISSIONS_READ,
                perms::ADMINS_MANAGE,
            ]))),
        )
        .route(
            routes::ADMINS,
            get(admins::list_admins_handler)
                .post(admins::create_admin_handler)
                .route_layer(gate(Requirement::one(perms::ADMINS_MANAGE))),
        )
        .route(
            routes::ADMINS_ID,
            delete(admins::delete_admin_handler)
                .route_layer(role_gate(&[roles::SUPER_ADMIN]))
                .get(admins::get_admin_handler)
                .put(admins::update_admin_handler)
                .route_layer(gate(Requirement::one(perms::ADMINS_MANAGE))),
        )
        .route(
            routes::ADMINS_ID_STATUS,
            patch(admins::update_admin_status_handler)
                .route_layer(gate(Requirement::one(perms::ADMINS_MANAGE))),
        )
        .route(
            routes::GET_AUDIT_LOGS_ENTITY,
            get(audit_logs::entity_history_handler)
                .route_layer(gate(Requirement::one(perms::AUDIT_READ))),
        )
        .route(
            routes::GET_AUDIT_LOGS_ACTOR,
            get(audit_logs::actor_history_handler).route_layer(gate(Requirement::all([
                perms::AUDIT_READ,
                perms::ADMINS_MANAGE,
            ]))),
        )
        .route(
            routes::GET_ERROR_LOGS,
            get(audit_logs::error_logs_handler)
                .route_layer(gate(Requirement::one(perms::AUDIT_READ))),
        )
        .route_layer(error_trail())
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin_auth,
        ));

    Router::new()
        .merge(frontend_public)
        .merge(frontend_protected)
        .merge(admin_public)
        .merge(admin_protected)
        .layer(from_fn(middleware::request_context::request_context))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
