//! Operational KPIs: AR aging, DSO, revenue trends, ranking, and the
//! weekend-posting anomaly check.
//!
//! Every calculator accepts an optional entity pre-filter (exact match on the
//! resolved entity field) and an explicit reference date where time matters.
//! DSO anchors to the dataset's latest date; YTD, variance, and trailing
//! anchor to the caller-supplied `today`, which for historical datasets can
//! mean an empty window.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use finstat_core::{
    category_net, date_span, filter_window, scope_owned, Chart, Side, SumPolicy, Transaction,
    Window,
};

/// date/account/amount projection used by detail lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxnDetail {
    pub date: Option<NaiveDate>,
    pub account: String,
    pub amount: f64,
}

impl TxnDetail {
    fn of(t: &Transaction) -> Self {
        Self {
            date: t.date,
            account: t.account.clone(),
            amount: t.amount,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Credit-side revenue sum over the scoped rows, optionally windowed.
/// Routed through the shared aggregation primitive like everything else.
fn revenue_credit_sum(rows: &[Transaction], chart: &Chart, window: Option<Window>) -> f64 {
    let windowed: Vec<Transaction> = match window {
        Some(w) => filter_window(rows, w).into_iter().cloned().collect(),
        None => rows.to_vec(),
    };
    category_net(&windowed, &chart.revenue_filter, SumPolicy::OneSided)
}

// ---------------------------------------------------------------------------
// AR aging

/// Five disjoint, exhaustive buckets over age in whole days. Future-dated
/// rows (negative age) land in `current`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgingBuckets {
    pub current: f64,
    #[serde(rename = "1-30_days")]
    pub days_1_30: f64,
    #[serde(rename = "31-60_days")]
    pub days_31_60: f64,
    #[serde(rename = "61-90_days")]
    pub days_61_90: f64,
    #[serde(rename = "over_90_days")]
    pub over_90: f64,
}

impl AgingBuckets {
    fn slot(&mut self, age_days: i64) -> &mut f64 {
        match age_days {
            i64::MIN..=0 => &mut self.current,
            1..=30 => &mut self.days_1_30,
            31..=60 => &mut self.days_31_60,
            61..=90 => &mut self.days_61_90,
            _ => &mut self.over_90,
        }
    }

    pub fn sum(&self) -> f64 {
        self.current + self.days_1_30 + self.days_31_60 + self.days_61_90 + self.over_90
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArAging {
    pub as_of_date: NaiveDate,
    pub aging_buckets: AgingBuckets,
    pub total_ar: f64,
    pub details: Vec<TxnDetail>,
}

/// Bucket AR debits by age relative to `as_of`. AR increases on debit, so
/// only debit rows are bucketed; rows without a parsed date are excluded.
pub fn ar_aging(
    rows: &[Transaction],
    chart: &Chart,
    as_of: NaiveDate,
    entity: Option<&str>,
) -> ArAging {
    let scoped = scope_owned(rows, entity);

    let mut buckets = AgingBuckets::default();
    let mut details = Vec::new();
    for t in &scoped {
        if t.side != Some(Side::Debit) || !chart.receivables.matches(&t.account) {
            continue;
        }
        let Some(date) = t.date else { continue };
        let age_days = (as_of - date).num_days();
        *buckets.slot(age_days) += t.amount;
        details.push(TxnDetail::of(t));
    }

    let total_ar = buckets.sum();
    ArAging {
        as_of_date: as_of,
        aging_buckets: buckets,
        total_ar,
        details,
    }
}

// ---------------------------------------------------------------------------
// DSO

#[derive(Debug, Clone, Serialize)]
pub struct Dso {
    pub period_days: u64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub ending_ar: f64,
    pub total_revenue: f64,
    pub avg_daily_sales: f64,
    pub dso: f64,
}

/// Days Sales Outstanding over the `period_days` ending at the latest
/// transaction date. Zero (never NaN or an error) when there is no credit
/// revenue in the period or no dated rows at all.
pub fn dso(rows: &[Transaction], chart: &Chart, period_days: u64, entity: Option<&str>) -> Dso {
    let scoped = scope_owned(rows, entity);

    let Some((_, end)) = date_span(&scoped) else {
        return Dso {
            period_days,
            start_date: None,
            end_date: None,
            ending_ar: 0.0,
            total_revenue: 0.0,
            avg_daily_sales: 0.0,
            dso: 0.0,
        };
    };
    let (start, end) = Window::trailing_bounds(end, period_days);

    let through_end: Vec<Transaction> = filter_window(&scoped, Window::Through(end))
        .into_iter()
        .cloned()
        .collect();
    let ending_ar = category_net(&through_end, &chart.receivables, SumPolicy::Netting);

    let total_revenue = revenue_credit_sum(&scoped, chart, Some(Window::Between(start, end)));

    let (avg_daily_sales, dso) = if total_revenue > 0.0 && period_days > 0 {
        let avg = total_revenue / period_days as f64;
        (avg, round2(ending_ar / avg))
    } else {
        (0.0, 0.0)
    };

    Dso {
        period_days,
        start_date: Some(start),
        end_date: Some(end),
        ending_ar,
        total_revenue,
        avg_daily_sales,
        dso,
    }
}

// ---------------------------------------------------------------------------
// Revenue YTD

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Per-month revenue, always all 12 months, serialized as a January→December
/// mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyBreakdown(pub [f64; 12]);

impl Serialize for MonthlyBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(12))?;
        for (name, value) in MONTH_NAMES.iter().zip(self.0.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueYtd {
    pub year: i32,
    pub ytd_total: f64,
    pub monthly_breakdown: MonthlyBreakdown,
    pub entity: Option<String>,
}

/// Credit revenue for the calendar year of `today`, with a 12-month
/// breakdown that is present even for months with no data.
pub fn revenue_ytd(
    rows: &[Transaction],
    chart: &Chart,
    entity: Option<&str>,
    today: NaiveDate,
) -> RevenueYtd {
    let scoped = scope_owned(rows, entity);
    let year = today.year();

    let mut monthly = MonthlyBreakdown::default();
    for month in 1..=12u32 {
        monthly.0[(month - 1) as usize] =
            revenue_credit_sum(&scoped, chart, Some(Window::Month { year, month }));
    }
    let ytd_total = monthly.0.iter().sum();

    RevenueYtd {
        year,
        ytd_total,
        monthly_breakdown: monthly,
        entity: entity.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Month-over-month variance

#[derive(Debug, Clone, Serialize)]
pub struct RevenueVariance {
    pub current_month: String,
    pub previous_month: String,
    pub current_revenue: f64,
    pub previous_revenue: f64,
    pub variance: f64,
    pub variance_percentage: f64,
    pub entity: Option<String>,
}

/// Revenue of the month containing `today` against the month before it
/// (December of the prior year when `today` is in January). Percentage is 0
/// when the previous month had no revenue.
pub fn revenue_variance(
    rows: &[Transaction],
    chart: &Chart,
    entity: Option<&str>,
    today: NaiveDate,
) -> RevenueVariance {
    let scoped = scope_owned(rows, entity);

    let (cur_year, cur_month) = (today.year(), today.month());
    let (prev_year, prev_month) = if cur_month == 1 {
        (cur_year - 1, 12)
    } else {
        (cur_year, cur_month - 1)
    };

    let current_revenue = revenue_credit_sum(
        &scoped,
        chart,
        Some(Window::Month { year: cur_year, month: cur_month }),
    );
    let previous_revenue = revenue_credit_sum(
        &scoped,
        chart,
        Some(Window::Month { year: prev_year, month: prev_month }),
    );

    let variance = current_revenue - previous_revenue;
    let variance_percentage = if previous_revenue > 0.0 {
        round2(variance / previous_revenue * 100.0)
    } else {
        0.0
    };

    RevenueVariance {
        current_month: format!("{cur_year}-{cur_month:02}"),
        previous_month: format!("{prev_year}-{prev_month:02}"),
        current_revenue,
        previous_revenue,
        variance,
        variance_percentage,
        entity: entity.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Trailing revenue

pub const TRAILING_WINDOW_DAYS: u64 = 90;

#[derive(Debug, Clone, Serialize)]
pub struct TrailingRevenue {
    pub period: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: f64,
    pub entity: Option<String>,
}

/// Credit revenue in the 90 days ending at `today`. Anchored to the caller's
/// reference date, not to the dataset's max date.
pub fn trailing_revenue(
    rows: &[Transaction],
    chart: &Chart,
    entity: Option<&str>,
    today: NaiveDate,
) -> TrailingRevenue {
    let scoped = scope_owned(rows, entity);
    let (start, end) = Window::trailing_bounds(today, TRAILING_WINDOW_DAYS);
    let total_revenue = revenue_credit_sum(&scoped, chart, Some(Window::Between(start, end)));

    TrailingRevenue {
        period: "Trailing 3 Months".to_string(),
        start_date: start,
        end_date: end,
        total_revenue,
        entity: entity.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Top-N revenue

#[derive(Debug, Clone, Serialize)]
pub struct TopRevenue {
    pub top_n: usize,
    pub transactions: Vec<TxnDetail>,
    pub entity: Option<String>,
}

/// Largest credit revenue rows, descending by amount, ties kept in input
/// order. Returns fewer than `n` rows without complaint when fewer match.
pub fn top_revenue(
    rows: &[Transaction],
    chart: &Chart,
    entity: Option<&str>,
    n: usize,
) -> TopRevenue {
    let scoped = scope_owned(rows, entity);

    let mut matched: Vec<&Transaction> = scoped
        .iter()
        .filter(|t| t.side == Some(Side::Credit) && chart.revenue_filter.matches(&t.account))
        .collect();
    // stable sort keeps original order among equal amounts
    matched.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    matched.truncate(n);

    TopRevenue {
        top_n: n,
        transactions: matched.into_iter().map(TxnDetail::of).collect(),
        entity: entity.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Weekend postings

#[derive(Debug, Clone, Serialize)]
pub struct WeekendTxn {
    pub date: NaiveDate,
    pub day: String,
    pub account: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub side: Option<Side>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekendPostings {
    pub unusual_type: String,
    pub count: usize,
    pub transactions: Vec<WeekendTxn>,
    pub entity: Option<String>,
}

/// Rows posted on a Saturday or Sunday, any account, any side.
pub fn weekend_postings(rows: &[Transaction], entity: Option<&str>) -> WeekendPostings {
    let scoped = scope_owned(rows, entity);

    let transactions: Vec<WeekendTxn> = scoped
        .iter()
        .filter_map(|t| {
            let date = t.date?;
            matches!(date.weekday(), Weekday::Sat | Weekday::Sun).then(|| WeekendTxn {
                date,
                day: date.format("%A").to_string(),
                account: t.account.clone(),
                amount: t.amount,
                side: t.side,
            })
        })
        .collect();

    WeekendPostings {
        unusual_type: "Weekend Postings".to_string(),
        count: transactions.len(),
        transactions,
        entity: entity.map(str::to_string),
    }
}
