//! Database migration support.
//!
//! Embeds and runs SQL migrations from `bastion_core/migrations/`: the
//! principal tables, the permission catalogue and menu, the audit log, and
//! the default grants for `super_admin`, `moderator` and `support`.

use sqlx::PgPool;
use tracing::info;

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}
