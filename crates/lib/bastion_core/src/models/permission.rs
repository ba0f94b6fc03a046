//! Permission catalogue models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A grantable capability, e.g. `users.create`. Codes never change once
/// seeded; roles reference permissions through `role_permissions` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Permission {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: String,
}
