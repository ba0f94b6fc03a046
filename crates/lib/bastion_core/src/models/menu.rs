//! Admin menu models: the flat store row and the materialized tree node.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One menu entry as fetched from the store, already filtered by role
/// visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub code: String,
    pub label: String,
    pub icon: Option<String>,
    pub path: Option<String>,
    /// Permission code required to see this entry, if any.
    pub required_permission: Option<String>,
    pub order_index: i32,
}

/// A node of the menu forest returned to the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: Uuid,
    pub code: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub order: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}
