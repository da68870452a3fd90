//! The aggregation engine: one summation routine shared by every statement
//! and KPI.
//!
//! For each category definition the engine nets the matching rows under the
//! chosen [`SumPolicy`], then keeps only categories whose result is strictly
//! positive. The section total is the sum of the RETAINED items only: a
//! category that nets to zero or negative vanishes from the line items AND
//! from the total. Callers that need the unsuppressed figure (net income,
//! DSO) go through [`category_net`] directly.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::classify::CategoryDef;
use crate::record::Transaction;
use crate::signing::{signed_amount, SumPolicy};

/// One statement section: retained line items and their sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Section {
    pub items: BTreeMap<String, f64>,
    pub total: f64,
}

/// Unsuppressed net for a single category. Rows with no debit/credit side
/// contribute nothing.
pub fn category_net(rows: &[Transaction], def: &CategoryDef, policy: SumPolicy) -> f64 {
    let increasing = def.class.increasing_side();
    rows.iter()
        .filter(|t| def.matches(&t.account))
        .filter_map(|t| t.side.map(|s| signed_amount(increasing, s, t.amount, policy)))
        .sum()
}

/// Aggregate a set of rows into a section over the given category defs,
/// retaining only strictly-positive nets.
pub fn aggregate_section(rows: &[Transaction], defs: &[CategoryDef], policy: SumPolicy) -> Section {
    let mut section = Section::default();
    for def in defs {
        let net = category_net(rows, def, policy);
        if net > 0.0 {
            section.items.insert(def.name.clone(), net);
            section.total += net;
        }
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{CategoryClass, CategoryDef};
    use crate::record::RawRecord;
    use serde_json::json;

    fn txn(account: &str, amount: f64, entry_type: &str) -> Transaction {
        Transaction::from_raw(&RawRecord {
            date: "2024-01-05".to_string(),
            account: account.to_string(),
            amount: json!(amount),
            entry_type: entry_type.to_string(),
            ..RawRecord::default()
        })
    }

    fn cash_def() -> CategoryDef {
        CategoryDef::named("Cash", CategoryClass::Asset)
    }

    #[test]
    fn test_netting_debit_minus_credit_for_assets() {
        let rows = vec![txn("Cash", 500.0, "debit"), txn("Cash", 200.0, "credit")];
        assert_eq!(category_net(&rows, &cash_def(), SumPolicy::Netting), 300.0);
    }

    #[test]
    fn test_one_sided_ignores_the_other_side() {
        let def = CategoryDef::named("Revenue", CategoryClass::Revenue);
        let rows = vec![
            txn("Revenue - Consulting", 1000.0, "credit"),
            txn("Revenue - Consulting", 400.0, "debit"),
        ];
        assert_eq!(category_net(&rows, &def, SumPolicy::OneSided), 1000.0);
        assert_eq!(category_net(&rows, &def, SumPolicy::Netting), 600.0);
    }

    #[test]
    fn test_negative_net_suppressed_from_items_and_total() {
        let defs = vec![
            CategoryDef::named("Cash", CategoryClass::Asset),
            CategoryDef::named("Inventory", CategoryClass::Asset),
        ];
        let rows = vec![
            txn("Cash", 100.0, "debit"),
            txn("Inventory", 50.0, "debit"),
            txn("Inventory", 80.0, "credit"),
        ];
        let section = aggregate_section(&rows, &defs, SumPolicy::Netting);
        // Inventory nets to -30: gone from items and excluded from the total,
        // so the total is 100, not 70.
        assert_eq!(section.items.len(), 1);
        assert_eq!(section.items.get("Cash"), Some(&100.0));
        assert_eq!(section.total, 100.0);
    }

    #[test]
    fn test_zero_net_suppressed() {
        let rows = vec![txn("Cash", 100.0, "debit"), txn("Cash", 100.0, "credit")];
        let section = aggregate_section(&rows, &[cash_def()], SumPolicy::Netting);
        assert!(section.items.is_empty());
        assert_eq!(section.total, 0.0);
    }

    #[test]
    fn test_sideless_rows_contribute_nothing() {
        let rows = vec![txn("Cash", 100.0, "debit"), txn("Cash", 999.0, "transfer")];
        assert_eq!(category_net(&rows, &cash_def(), SumPolicy::Netting), 100.0);
    }

    #[test]
    fn test_empty_input_is_well_formed() {
        let section = aggregate_section(&[], &[cash_def()], SumPolicy::Netting);
        assert!(section.items.is_empty());
        assert_eq!(section.total, 0.0);
    }
}
