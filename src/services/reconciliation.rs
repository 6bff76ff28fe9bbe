//! Catalog reconciliation: which master items a project has not imported yet,
//! and the records that import them.

use crate::entities::{master_item, project_item};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use std::collections::HashSet;
use uuid::Uuid;

/// Master items whose id is not referenced by any existing line, in catalog order.
pub fn missing_master_items<'a>(
    master: &'a [master_item::Model],
    existing: &[project_item::Model],
) -> Vec<&'a master_item::Model> {
    let imported: HashSet<i32> = existing.iter().filter_map(|i| i.source_item_id).collect();
    master
        .iter()
        .filter(|m| !imported.contains(&m.id))
        .collect()
}

/// Insertable lines for `missing`, appended after `existing_count` lines.
///
/// Timestamps are set explicitly because batch inserts bypass
/// `ActiveModelBehavior`.
pub fn build_import_records(
    project_id: Uuid,
    missing: &[&master_item::Model],
    existing_count: usize,
    now: DateTime<Utc>,
) -> Vec<project_item::ActiveModel> {
    missing
        .iter()
        .enumerate()
        .map(|(idx, m)| project_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(project_id),
            source_item_id: Set(Some(m.id)),
            description: Set(m.description.clone()),
            quantity: Set(m.quantity.clone()),
            unit: Set(m.unit.clone()),
            cost_price: Set(m.cost_price),
            selling_price: Set(m.selling_price),
            is_selected: Set(true),
            sort_order: Set(sort_order_at(existing_count, idx)),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .collect()
}

pub(crate) fn sort_order_at(existing_count: usize, idx: usize) -> i32 {
    i32::try_from(existing_count + idx).unwrap_or(i32::MAX)
}
