//! Login flows for both domains, delegating to `bastion_core::auth`.
//!
//! Every failure short of a backend error collapses into the same
//! "invalid email or password" answer.

use bastion_core::auth::credentials::check_credentials;
use bastion_core::models::auth::Admin;
use bastion_core::store::{PrincipalStore, StoreError, StoreResult};
use tracing::{debug, info};

use crate::AppState;
use crate::error::{AppError, AppResult, INVALID_CREDENTIALS};
use crate::models::{AdminLoginResponse, AdminProfile, UserLoginResponse, UserProfile};

const TOKEN_TYPE: &str = "Bearer";

fn rejected() -> AppError {
    AppError::Unauthorized(INVALID_CREDENTIALS.into())
}

/// Map a lookup miss to the uniform credential error.
fn or_rejected<T>(result: StoreResult<T>) -> AppResult<T> {
    match result {
        Ok(v) => Ok(v),
        Err(StoreError::NotFound) => Err(rejected()),
        Err(e) => Err(e.into()),
    }
}

/// Authenticate an end user by email and password.
pub async fn user_login(
    state: &AppState,
    email: &str,
    password: &str,
) -> AppResult<UserLoginResponse> {
    let user = or_rejected(state.store.find_user_by_email(email.trim()).await)?;
    check_credentials(password, &user.password_hash).map_err(|_| rejected())?;

    let token = state.user_tokens.issue(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(UserLoginResponse {
        token,
        token_type: TOKEN_TYPE.into(),
        expires_in: state.user_tokens.ttl().num_seconds(),
        user: UserProfile::from(&user),
    })
}

/// Look up an admin by email, falling back to username.
async fn find_admin_for_login<S>(store: &S, login: &str) -> AppResult<Admin>
where
    S: PrincipalStore + ?Sized,
{
    match store.find_admin_by_email(login).await {
        Ok(admin) => Ok(admin),
        Err(StoreError::NotFound) => or_rejected(store.find_admin_by_username(login).await),
        Err(e) => Err(e.into()),
    }
}

/// Authenticate an admin. Inactive admins are refused only after the
/// password check passes.
pub async fn admin_login(
    state: &AppState,
    login: &str,
    password: &str,
) -> AppResult<AdminLoginResponse> {
    let admin = find_admin_for_login(state.store.as_ref(), login.trim()).await?;
    check_credentials(password, &admin.password_hash).map_err(|_| rejected())?;
    if !admin.is_active {
        debug!(admin_id = %admin.id, "login refused for inactive admin");
        return Err(AppError::Unauthorized("admin account is disabled".into()));
    }

    let token = state.admin_tokens.issue(&admin)?;
    info!(admin_id = %admin.id, role = %admin.role, "admin logged in");
    Ok(AdminLoginResponse {
        token,
        token_type: TOKEN_TYPE.into(),
        expires_in: state.admin_tokens.ttl().num_seconds(),
        admin: AdminProfile::from(&admin),
    })
}
