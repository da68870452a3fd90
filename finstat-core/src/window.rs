//! Time windows over transaction rows.
//!
//! Every windowed view excludes rows whose date failed to parse; missing
//! dates are a data-quality issue, never an error.

use chrono::{Datelike, Days, NaiveDate};

use crate::record::Transaction;

/// A window specification relative to a caller-supplied reference date.
/// Nothing here reads the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// All rows dated on or before `end` (inclusive).
    Through(NaiveDate),
    /// Inclusive date range.
    Between(NaiveDate, NaiveDate),
    /// The `days` days ending at `as_of` (inclusive on both ends).
    TrailingDays { as_of: NaiveDate, days: u64 },
    /// One calendar month.
    Month { year: i32, month: u32 },
    /// One calendar year.
    Year(i32),
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Window::Through(end) => date <= end,
            Window::Between(start, end) => start <= date && date <= end,
            Window::TrailingDays { as_of, days } => {
                let start = as_of.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
                start <= date && date <= as_of
            }
            Window::Month { year, month } => date.year() == year && date.month() == month,
            Window::Year(year) => date.year() == year,
        }
    }

    /// Start/end bounds of a trailing window, for report labelling.
    pub fn trailing_bounds(as_of: NaiveDate, days: u64) -> (NaiveDate, NaiveDate) {
        let start = as_of.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        (start, as_of)
    }
}

/// Rows inside the window. Rows without a parsed date are dropped.
pub fn filter_window<'a>(rows: &'a [Transaction], window: Window) -> Vec<&'a Transaction> {
    rows.iter()
        .filter(|t| t.date.is_some_and(|d| window.contains(d)))
        .collect()
}

/// Earliest and latest parsed dates across the rows, if any row has one.
pub fn date_span(rows: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let dates: Vec<NaiveDate> = rows.iter().filter_map(|t| t.date).collect();
    let min = dates.iter().min()?;
    let max = dates.iter().max()?;
    Some((*min, *max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;
    use serde_json::json;

    fn txn(date: &str) -> Transaction {
        Transaction::from_raw(&RawRecord {
            date: date.to_string(),
            account: "Cash".to_string(),
            amount: json!(1),
            entry_type: "debit".to_string(),
            ..RawRecord::default()
        })
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_trailing_window_inclusive_bounds() {
        let w = Window::TrailingDays { as_of: d("2024-04-10"), days: 90 };
        assert!(w.contains(d("2024-04-10")));
        assert!(w.contains(d("2024-01-11")));
        assert!(!w.contains(d("2024-01-10")));
        assert!(!w.contains(d("2024-04-11")));
    }

    #[test]
    fn test_month_and_year_windows() {
        assert!(Window::Month { year: 2024, month: 2 }.contains(d("2024-02-29")));
        assert!(!Window::Month { year: 2024, month: 2 }.contains(d("2023-02-15")));
        assert!(Window::Year(2024).contains(d("2024-12-31")));
        assert!(!Window::Year(2024).contains(d("2025-01-01")));
    }

    #[test]
    fn test_undated_rows_are_excluded_not_fatal() {
        let rows = vec![txn("2024-01-05"), txn("garbage"), txn("2024-03-01")];
        let kept = filter_window(&rows, Window::Through(d("2024-12-31")));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_date_span() {
        let rows = vec![txn("2024-03-01"), txn("bad"), txn("2024-01-05")];
        assert_eq!(date_span(&rows), Some((d("2024-01-05"), d("2024-03-01"))));
        assert_eq!(date_span(&[txn("bad")]), None);
        assert_eq!(date_span(&[]), None);
    }
}
