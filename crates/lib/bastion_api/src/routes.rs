//! Route paths for the frontend (`/api/v1`) and admin (`/api/admin/v1`) APIs.

pub const POST_USER_LOGIN: &str = "/api/v1/auth/login";
pub const GET_USER_ME: &str = "/api/v1/me";

pub const POST_ADMIN_LOGIN: &str = "/api/admin/v1/auth/login";
pub const GET_ADMIN_ME: &str = "/api/admin/v1/me";
pub const GET_ADMIN_MENU: &str = "/api/admin/v1/menu";
pub const GET_ADMIN_PERMISSIONS: &str = "/api/admin/v1/permissions";

pub const ADMINS: &str = "/api/admin/v1/admins";
pub const ADMINS_ID: &str = "/api/admin/v1/admins/{id}";
pub const ADMINS_ID_STATUS: &str = "/api/admin/v1/admins/{id}/status";

pub const GET_AUDIT_LOGS_ENTITY: &str =
    "/api/admin/v1/audit-logs/entities/{entity_type}/{entity_id}";
pub const GET_AUDIT_LOGS_ACTOR: &str = "/api/admin/v1/audit-logs/actors/{actor_id}";
pub const GET_ERROR_LOGS: &str = "/api/admin/v1/error-logs";

/// Permission codes the built-in routes are gated on.
pub mod perms {
    pub const ADMINS_MANAGE: &str = "admins.manage";
    pub const AUDIT_READ: &str = "audit.read";
    pub const PERMISSIONS_READ: &str = "permissions.read";
}

/// Roles the built-in role gates admit.
pub mod roles {
    pub const SUPER_ADMIN: &str = "super_admin";
}
