//! Menu queries backing [`crate::store::PgStore`].

use sqlx::PgPool;

use crate::models::menu::MenuRow;
use crate::store::StoreResult;

/// Active menu rows visible to `role`: those with no required permission,
/// and those whose required permission the role holds.
pub async fn menu_rows_visible_to_role(pool: &PgPool, role: &str) -> StoreResult<Vec<MenuRow>> {
    let rows = sqlx::query_as::<_, MenuRow>(
        "SELECT m.id, m.parent_id, m.code, m.label, m.icon, m.path, \
                p.code AS required_permission, m.order_index \
         FROM menu_items m \
         LEFT JOIN permissions p ON p.id = m.permission_id \
         WHERE m.is_active \
           AND (m.permission_id IS NULL OR EXISTS ( \
                 SELECT 1 FROM role_permissions rp \
                 WHERE rp.role = $1 AND rp.permission_id = m.permission_id)) \
         ORDER BY m.order_index, m.code",
    )
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
