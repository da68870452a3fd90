//! Entity grouping: partition rows by subsidiary/business-unit label.

use std::collections::BTreeMap;

use crate::record::Transaction;

/// Label for rows with no resolvable entity field.
pub const UNKNOWN_ENTITY: &str = "Unknown";

/// The display label for a row's entity.
pub fn entity_label(txn: &Transaction) -> &str {
    txn.entity.as_deref().unwrap_or(UNKNOWN_ENTITY)
}

/// Rows whose entity field equals `entity` exactly (case sensitive).
/// A row with no entity field never matches a filter, by design: filtering
/// for a named entity over unlabelled data yields zero rows, not an error.
pub fn filter_entity<'a>(rows: &'a [Transaction], entity: &str) -> Vec<&'a Transaction> {
    rows.iter()
        .filter(|t| t.entity.as_deref() == Some(entity))
        .collect()
}

/// Apply an optional entity filter, the pre-filter every KPI accepts.
pub fn scope<'a>(rows: &'a [Transaction], entity: Option<&str>) -> Vec<&'a Transaction> {
    match entity {
        Some(e) => filter_entity(rows, e),
        None => rows.iter().collect(),
    }
}

/// Owned variant of [`scope`] for callers that go on to re-aggregate the
/// scoped rows several times.
pub fn scope_owned(rows: &[Transaction], entity: Option<&str>) -> Vec<Transaction> {
    scope(rows, entity).into_iter().cloned().collect()
}

/// Partition rows by entity label, unlabelled rows under [`UNKNOWN_ENTITY`].
pub fn group_by_entity(rows: &[Transaction]) -> BTreeMap<String, Vec<&Transaction>> {
    let mut groups: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
    for t in rows {
        groups.entry(entity_label(t).to_string()).or_default().push(t);
    }
    groups
}

/// Sorted unique entity labels present in the data (excluding the sentinel).
pub fn list_entities(rows: &[Transaction]) -> Vec<String> {
    let mut names: Vec<String> = rows
        .iter()
        .filter_map(|t| t.entity.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}
