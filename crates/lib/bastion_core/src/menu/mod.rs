//! Role-driven hierarchical admin menu.
//!
//! The store returns the flat rows a role may see; [`build_menu_tree`] turns
//! them into an ordered forest. Rows whose parent was not returned (hidden,
//! inactive or missing) are dropped together with their descendants.

pub mod queries;

use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;

use crate::models::menu::{MenuNode, MenuRow};
use crate::store::{MenuStore, StoreResult};

/// Fetch the rows visible to `role` and materialize them.
pub async fn build_menu<S>(store: &S, role: &str) -> StoreResult<Vec<MenuNode>>
where
    S: MenuStore + ?Sized,
{
    let rows = store.menu_rows_visible_to_role(role).await?;
    let fetched = rows.len();
    let menu = build_menu_tree(&rows);
    debug!(role, fetched, roots = menu.len(), "built admin menu");
    Ok(menu)
}

/// Build the menu forest from flat rows.
///
/// Roots and each child list are sorted by `order_index`, ties keeping fetch
/// order. When two rows share an id the first one wins. Rows that cannot
/// reach a root (orphans, self-parented rows, cycles) are left out.
pub fn build_menu_tree(rows: &[MenuRow]) -> Vec<MenuNode> {
    // Pass A: index rows by id.
    let mut by_id: HashMap<Uuid, &MenuRow> = HashMap::with_capacity(rows.len());
    let mut unique: Vec<&MenuRow> = Vec::with_capacity(rows.len());
    for row in rows {
        if by_id.contains_key(&row.id) {
            debug!(id = %row.id, code = %row.code, "duplicate menu row ignored");
            continue;
        }
        by_id.insert(row.id, row);
        unique.push(row);
    }

    // Pass B: attach every row to its parent or to the root list.
    let mut roots: Vec<&MenuRow> = Vec::new();
    let mut children: HashMap<Uuid, Vec<&MenuRow>> = HashMap::new();
    for row in unique {
        match row.parent_id {
            None => roots.push(row),
            Some(parent) if by_id.contains_key(&parent) => {
                children.entry(parent).or_default().push(row)
            }
            Some(parent) => {
                debug!(id = %row.id, code = %row.code, %parent, "orphan menu row dropped")
            }
        }
    }

    roots.sort_by_key(|r| r.order_index);
    for list in children.values_mut() {
        list.sort_by_key(|r| r.order_index);
    }

    let mut visited = HashSet::with_capacity(by_id.len());
    roots
        .into_iter()
        .filter_map(|row| materialize(row, &children, &mut visited))
        .collect()
}

fn materialize(
    row: &MenuRow,
    children: &HashMap<Uuid, Vec<&MenuRow>>,
    visited: &mut HashSet<Uuid>,
) -> Option<MenuNode> {
    if !visited.insert(row.id) {
        return None;
    }
    let kids = children
        .get(&row.id)
        .map(|list| {
            list.iter()
                .filter_map(|child| materialize(child, children, visited))
                .collect()
        })
        .unwrap_or_default();
    Some(MenuNode {
        id: row.id,
        code: row.code.clone(),
        label: row.label.clone(),
        icon: row.icon.clone(),
        path: row.path.clone(),
        order: row.order_index,
        children: kids,
    })
}
