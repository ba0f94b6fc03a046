//! Principal queries backing [`crate::store::PgStore`].

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::auth::{Admin, NewAdmin, User};
use crate::store::StoreResult;
use crate::uuid::uuidv7;

const USER_COLUMNS: &str =
    "id, email, username, password_hash, first_name, last_name, created_at, updated_at";

const ADMIN_COLUMNS: &str = "id, email, username, password_hash, first_name, last_name, \
     role, is_active, created_at, updated_at";

async fn fetch_user(pool: &PgPool, column: &str, value: &str) -> StoreResult<User> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(value)
        .fetch_one(pool)
        .await?;
    Ok(user)
}

async fn fetch_admin(pool: &PgPool, column: &str, value: &str) -> StoreResult<Admin> {
    let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE {column} = $1");
    let admin = sqlx::query_as::<_, Admin>(&sql)
        .bind(value)
        .fetch_one(pool)
        .await?;
    Ok(admin)
}

/// Fetch a user by id.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> StoreResult<User> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(user)
}

/// Fetch a user by email (case-insensitive).
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> StoreResult<User> {
    fetch_user(pool, "lower(email)", &email.to_lowercase()).await
}

/// Fetch a user by username.
pub async fn find_user_by_username(pool: &PgPool, username: &str) -> StoreResult<User> {
    fetch_user(pool, "username", username).await
}

/// Fetch an admin by id, active or not.
pub async fn find_admin_by_id(pool: &PgPool, id: Uuid) -> StoreResult<Admin> {
    let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1");
    let admin = sqlx::query_as::<_, Admin>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(admin)
}

/// Fetch an admin by email (case-insensitive).
pub async fn find_admin_by_email(pool: &PgPool, email: &str) -> StoreResult<Admin> {
    fetch_admin(pool, "lower(email)", &email.to_lowercase()).await
}

/// Fetch an admin by username.
pub async fn find_admin_by_username(pool: &PgPool, username: &str) -> StoreResult<Admin> {
    fetch_admin(pool, "username", username).await
}

/// Page through admins, oldest first.
pub async fn list_admins(pool: &PgPool, limit: i64, offset: i64) -> StoreResult<Vec<Admin>> {
    let sql = format!(
        "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at, id LIMIT $1 OFFSET $2"
    );
    let admins = sqlx::query_as::<_, Admin>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(admins)
}

/// Insert a new, active admin. Duplicate email or username surfaces as
/// [`crate::store::StoreError::Conflict`].
pub async fn create_admin(pool: &PgPool, new_admin: &NewAdmin) -> StoreResult<Admin> {
    let sql = format!(
        "INSERT INTO admins (id, email, username, password_hash, first_name, last_name, role) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {ADMIN_COLUMNS}"
    );
    let admin = sqlx::query_as::<_, Admin>(&sql)
        .bind(uuidv7())
        .bind(&new_admin.email)
        .bind(&new_admin.username)
        .bind(&new_admin.password_hash)
        .bind(&new_admin.first_name)
        .bind(&new_admin.last_name)
        .bind(&new_admin.role)
        .fetch_one(pool)
        .await?;
    Ok(admin)
}

/// Flip an admin's active flag, returning the updated record.
pub async fn set_admin_active(pool: &PgPool, id: Uuid, is_active: bool) -> StoreResult<Admin> {
    let sql = format!(
        "UPDATE admins SET is_active = $2, updated_at = now() WHERE id = $1 \
         RETURNING {ADMIN_COLUMNS}"
    );
    let admin = sqlx::query_as::<_, Admin>(&sql)
        .bind(id)
        .bind(is_active)
        .fetch_one(pool)
        .await?;
    Ok(admin)
}

/// Overwrite an admin's mutable fields. Duplicate email or username surfaces
/// as [`crate::store::StoreError::Conflict`].
pub async fn update_admin(pool: &PgPool, admin: &Admin) -> StoreResult<Admin> {
    let sql = format!(
        "UPDATE admins SET email = $2, username = $3, password_hash = $4, first_name = $5, \
         last_name = $6, role = $7, is_active = $8, updated_at = now() WHERE id = $1 \
         RETURNING {ADMIN_COLUMNS}"
    );
    let admin = sqlx::query_as::<_, Admin>(&sql)
        .bind(admin.id)
        .bind(&admin.email)
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(&admin.first_name)
        .bind(&admin.last_name)
        .bind(&admin.role)
        .bind(admin.is_active)
        .fetch_one(pool)
        .await?;
    Ok(admin)
}
