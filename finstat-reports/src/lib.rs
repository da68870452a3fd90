//! finstat-reports: financial statements, operational KPIs, and the entity
//! breakdown the chat layer consumes. Every report here is a view over the
//! finstat-core aggregation engine; none of them reads the wall clock —
//! reference dates are always parameters.

pub mod insight;
pub mod kpi;
pub mod statements;

pub use insight::{entity_breakdown, EntityActivity, EntityBreakdown};
pub use kpi::{
    ar_aging, dso, revenue_variance, revenue_ytd, top_revenue, trailing_revenue,
    weekend_postings, AgingBuckets, ArAging, Dso, MonthlyBreakdown, RevenueVariance,
    RevenueYtd, TopRevenue, TrailingRevenue, TxnDetail, WeekendPostings, WeekendTxn,
};
pub use statements::{
    balance_sheet, cash_flow, profit_loss, Activity, BalanceSheet, CashFlow, ProfitLoss,
};
