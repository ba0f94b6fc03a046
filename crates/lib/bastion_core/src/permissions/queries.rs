//! Permission queries backing [`crate::store::PgStore`].

use std::collections::HashSet;

use sqlx::PgPool;

use crate::models::permission::Permission;
use crate::store::StoreResult;

/// Permission codes granted to a role.
pub async fn role_permission_codes(pool: &PgPool, role: &str) -> StoreResult<HashSet<String>> {
    let codes = sqlx::query_scalar::<_, String>(
        "SELECT p.code FROM permissions p \
         JOIN role_permissions rp ON rp.permission_id = p.id \
         WHERE rp.role = $1",
    )
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(codes.into_iter().collect())
}

/// Permission records granted to a role.
pub async fn role_permissions(pool: &PgPool, role: &str) -> StoreResult<Vec<Permission>> {
    let rows = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.code, p.name, p.category FROM permissions p \
         JOIN role_permissions rp ON rp.permission_id = p.id \
         WHERE rp.role = $1 \
         ORDER BY p.category, p.code",
    )
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
