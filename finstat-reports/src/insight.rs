//! Entity breakdown: the precomputed aggregate handed to the conversational
//! layer. Revenue and expense totals per entity plus a per-entity activity
//! summary, so the chat layer never re-derives classification rules.

use serde::Serialize;
use std::collections::BTreeMap;

use finstat_core::{entity_label, Chart, Side, Transaction};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityActivity {
    pub total_transactions: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityBreakdown {
    pub total_transactions: usize,
    pub revenue_by_entity: BTreeMap<String, f64>,
    pub expenses_by_entity: BTreeMap<String, f64>,
    pub summary: BTreeMap<String, EntityActivity>,
}

impl EntityBreakdown {
    /// Entity with the largest revenue, if any revenue was seen.
    pub fn highest_revenue(&self) -> Option<(&str, f64)> {
        self.revenue_by_entity
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, total)| (name.as_str(), *total))
    }

    /// Entities ranked by revenue, descending.
    pub fn revenue_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .revenue_by_entity
            .iter()
            .map(|(name, total)| (name.as_str(), *total))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue_by_entity.values().sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses_by_entity.values().sum()
    }
}

/// Build the breakdown. Revenue rows are positive credit amounts on accounts
/// matching the broad revenue filter; expense rows are positive debit
/// amounts on the broad expense filter. Unlabelled rows group under
/// "Unknown".
pub fn entity_breakdown(rows: &[Transaction], chart: &Chart) -> EntityBreakdown {
    let mut breakdown = EntityBreakdown {
        total_transactions: rows.len(),
        ..EntityBreakdown::default()
    };

    for t in rows {
        let entity = entity_label(t).to_string();

        if t.amount > 0.0 {
            match t.side {
                Some(Side::Credit) if chart.revenue_filter.matches(&t.account) => {
                    *breakdown.revenue_by_entity.entry(entity.clone()).or_insert(0.0) += t.amount;
                }
                Some(Side::Debit) if chart.expense_filter.matches(&t.account) => {
                    *breakdown.expenses_by_entity.entry(entity.clone()).or_insert(0.0) += t.amount;
                }
                _ => {}
            }
        }

        let activity = breakdown.summary.entry(entity).or_default();
        activity.total_transactions += 1;
        activity.total_amount += t.amount.abs();
    }

    breakdown
}
