//! Statement generators: Balance Sheet, Profit & Loss, Cash Flow.
//!
//! All three are fixed recipes over [`aggregate_section`]: which categories,
//! which summation policy, and how the section totals are shaped. The
//! balance sheet reports `total_liabilities_and_equity` as a definitional
//! sum and does NOT assert it equals total assets — there is no double-entry
//! balancing here, callers reconcile.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use finstat_core::{
    aggregate_section, category_net, date_span, Chart, Section, Side, SumPolicy, Transaction,
};

#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    pub as_of_date: NaiveDate,
    pub assets: Section,
    pub liabilities: Section,
    pub equity: Section,
    pub total_liabilities_and_equity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfitLoss {
    pub period: String,
    pub revenue: Section,
    pub expenses: Section,
    pub net_income: f64,
}

/// One cash-flow activity group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Activity {
    pub inflow: f64,
    pub outflow: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashFlow {
    pub period: String,
    #[serde(flatten)]
    pub activities: BTreeMap<String, Activity>,
    pub net_change_in_cash: f64,
}

/// Period label: min to max parsed date across ALL input rows (not just the
/// rows a statement retains), "N/A" when nothing has a date.
fn period_label(rows: &[Transaction]) -> String {
    match date_span(rows) {
        Some((min, max)) => format!("{} to {}", min.format("%Y-%m-%d"), max.format("%Y-%m-%d")),
        None => "N/A".to_string(),
    }
}

/// Net income for the retained-earnings fold: one-sided revenue minus
/// one-sided expenses, summed per category WITHOUT the positivity filter the
/// P&L line items get. The fold and the P&L can therefore disagree when a
/// category nets negative.
fn net_income_rollup(rows: &[Transaction], chart: &Chart) -> f64 {
    let revenue: f64 = chart
        .revenue
        .iter()
        .map(|def| category_net(rows, def, SumPolicy::OneSided))
        .sum();
    let expenses: f64 = chart
        .expenses
        .iter()
        .map(|def| category_net(rows, def, SumPolicy::OneSided))
        .sum();
    revenue - expenses
}

/// Balance sheet as of `as_of`: netting convention per category, positive
/// nets retained, net income folded into a Retained Earnings equity line.
pub fn balance_sheet(rows: &[Transaction], chart: &Chart, as_of: NaiveDate) -> BalanceSheet {
    let assets = aggregate_section(rows, &chart.assets, SumPolicy::Netting);
    let liabilities = aggregate_section(rows, &chart.liabilities, SumPolicy::Netting);
    let mut equity = aggregate_section(rows, &chart.equity, SumPolicy::Netting);

    let net_income = net_income_rollup(rows, chart);
    *equity.items.entry("Retained Earnings".to_string()).or_insert(0.0) += net_income;
    equity.total += net_income;

    let total_liabilities_and_equity = liabilities.total + equity.total;

    BalanceSheet {
        as_of_date: as_of,
        assets,
        liabilities,
        equity,
        total_liabilities_and_equity,
    }
}

/// Profit & loss: one-sided sums (revenue credit-only, expenses debit-only),
/// positive categories retained, net income from the retained totals.
pub fn profit_loss(rows: &[Transaction], chart: &Chart) -> ProfitLoss {
    let revenue = aggregate_section(rows, &chart.revenue, SumPolicy::OneSided);
    let expenses = aggregate_section(rows, &chart.expenses, SumPolicy::OneSided);
    let net_income = revenue.total - expenses.total;

    ProfitLoss {
        period: period_label(rows),
        revenue,
        expenses,
        net_income,
    }
}

/// Cash flow: each activity group is the conjunction of "cash" and a
/// group-specific keyword set; inflow = debit sum, outflow = credit sum.
/// No reconciliation against an ending cash balance.
pub fn cash_flow(rows: &[Transaction], chart: &Chart) -> CashFlow {
    let mut activities = BTreeMap::new();
    let mut net_change_in_cash = 0.0;

    for group in &chart.activities {
        let mut activity = Activity::default();
        for t in rows.iter().filter(|t| group.matches(&t.account)) {
            match t.side {
                Some(Side::Debit) => activity.inflow += t.amount,
                Some(Side::Credit) => activity.outflow += t.amount,
                None => {}
            }
        }
        activity.net = activity.inflow - activity.outflow;
        net_change_in_cash += activity.net;
        activities.insert(group.name.clone(), activity);
    }

    CashFlow {
        period: period_label(rows),
        activities,
        net_change_in_cash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstat_core::RawRecord;
    use serde_json::json;

    fn txn(date: &str, account: &str, amount: f64, entry_type: &str) -> Transaction {
        Transaction::from_raw(&RawRecord {
            date: date.to_string(),
            account: account.to_string(),
            amount: json!(amount),
            entry_type: entry_type.to_string(),
            ..RawRecord::default()
        })
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn("2024-01-05", "Cash", 5000.0, "debit"),
            txn("2024-01-10", "Accounts Receivable", 2000.0, "debit"),
            txn("2024-01-12", "Accounts Payable", 1500.0, "credit"),
            txn("2024-01-15", "Capital", 4000.0, "credit"),
            txn("2024-01-20", "Revenue - Consulting", 3000.0, "credit"),
            txn("2024-01-25", "Salaries", 1000.0, "debit"),
        ]
    }

    #[test]
    fn test_balance_sheet_sections_and_identity() {
        let rows = sample();
        let bs = balance_sheet(&rows, &Chart::default(), d("2024-02-01"));

        assert_eq!(bs.assets.items.get("Cash"), Some(&5000.0));
        assert_eq!(bs.assets.items.get("Accounts Receivable"), Some(&2000.0));
        assert_eq!(bs.assets.total, 7000.0);
        assert_eq!(bs.liabilities.total, 1500.0);

        // equity = 4000 capital + (3000 revenue - 1000 salaries) folded in
        assert_eq!(bs.equity.items.get("Retained Earnings"), Some(&2000.0));
        assert_eq!(bs.equity.total, 6000.0);

        // definitional identity, not a balancing assertion
        assert_eq!(
            bs.total_liabilities_and_equity,
            bs.liabilities.total + bs.equity.total
        );
    }

    #[test]
    fn test_retained_earnings_fold_can_go_negative() {
        let rows = vec![
            txn("2024-01-05", "Salaries", 900.0, "debit"),
            txn("2024-01-06", "Revenue", 100.0, "credit"),
        ];
        let bs = balance_sheet(&rows, &Chart::default(), d("2024-02-01"));
        // fold uses the unsuppressed rollup: 100 - 900
        assert_eq!(bs.equity.items.get("Retained Earnings"), Some(&-800.0));
        assert_eq!(bs.equity.total, -800.0);
    }

    #[test]
    fn test_profit_loss_identity_and_period() {
        let rows = sample();
        let pl = profit_loss(&rows, &Chart::default());
        assert_eq!(pl.revenue.total, 3000.0);
        assert_eq!(pl.expenses.total, 1000.0);
        assert_eq!(pl.net_income, pl.revenue.total - pl.expenses.total);
        assert_eq!(pl.period, "2024-01-05 to 2024-01-25");
    }

    #[test]
    fn test_profit_loss_expense_credits_ignored_not_negated() {
        let rows = vec![
            txn("2024-01-05", "Rent", 800.0, "debit"),
            txn("2024-01-06", "Rent", 300.0, "credit"),
        ];
        let pl = profit_loss(&rows, &Chart::default());
        // one-sided: the credit neither reduces nor appears
        assert_eq!(pl.expenses.items.get("Rent"), Some(&800.0));
        assert_eq!(pl.net_income, -800.0);
    }

    #[test]
    fn test_empty_input_period_na() {
        let pl = profit_loss(&[], &Chart::default());
        assert_eq!(pl.period, "N/A");
        assert_eq!(pl.net_income, 0.0);
        assert!(pl.revenue.items.is_empty());
    }

    #[test]
    fn test_cash_flow_groups_and_net_change() {
        let rows = vec![
            txn("2024-01-05", "Cash - Revenue Collections", 900.0, "debit"),
            txn("2024-01-06", "Cash - Operating Expenses", 400.0, "credit"),
            txn("2024-01-07", "Cash - Equipment Purchase", 250.0, "credit"),
            txn("2024-01-08", "Cash - Loan Proceeds", 600.0, "debit"),
            // plain cash row matches no activity group
            txn("2024-01-09", "Cash", 999.0, "debit"),
        ];
        let cf = cash_flow(&rows, &Chart::default());

        let operating = &cf.activities["operating_activities"];
        assert_eq!(operating.inflow, 900.0);
        assert_eq!(operating.outflow, 400.0);
        assert_eq!(operating.net, 500.0);

        assert_eq!(cf.activities["investing_activities"].net, -250.0);
        assert_eq!(cf.activities["financing_activities"].net, 600.0);
        assert_eq!(cf.net_change_in_cash, 500.0 - 250.0 + 600.0);
    }

    #[test]
    fn test_statements_are_idempotent() {
        let rows = sample();
        let chart = Chart::default();
        let a = serde_json::to_string(&balance_sheet(&rows, &chart, d("2024-02-01"))).unwrap();
        let b = serde_json::to_string(&balance_sheet(&rows, &chart, d("2024-02-01"))).unwrap();
        assert_eq!(a, b);
    }
}
