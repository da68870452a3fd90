//! Transaction records: semi-structured input rows and their typed form.
//!
//! Input rows arrive from CSV uploads or JSON bodies, so every field can be
//! missing or malformed. Conversion never fails a batch: a bad date becomes
//! `None`, a bad amount becomes 0.0, an unknown entry type becomes `None`.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

use crate::signing::Side;

/// A raw transaction row as received from the outside world.
///
/// `amount` stays a JSON value because uploads deliver either numbers or
/// strings like `"$1,200.50"`. The three entity synonyms are resolved in
/// priority order (`entity` > `subsidiary` > `company`) during typing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub amount: Value,
    #[serde(default, rename = "type")]
    pub entry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsidiary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// A typed transaction row, the unit the aggregation engine works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// `None` when the raw date did not parse; such rows are excluded from
    /// every date-dependent view but still count toward undated aggregates.
    pub date: Option<NaiveDate>,
    pub account: String,
    pub amount: f64,
    /// `None` for entry types other than debit/credit; such rows contribute
    /// to no category total.
    pub side: Option<Side>,
    /// Resolved entity label; `None` groups under [`crate::entity::UNKNOWN_ENTITY`].
    pub entity: Option<String>,
}

static AMOUNT_JUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9eE.+\-]").expect("static amount regex"));

/// Coerce a JSON amount to f64. Numbers pass through; strings are cleaned of
/// currency symbols and thousands separators first. Anything else is 0.0.
pub fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let cleaned = AMOUNT_JUNK.replace_all(s.trim(), "");
            cleaned.parse().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Parse a calendar date from the formats uploads actually contain.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    // ISO datetimes: keep the date part
    let s = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

fn non_blank(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Transaction {
    /// Type a raw row. Total: every raw row produces a transaction, with
    /// unusable fields degraded rather than rejected.
    pub fn from_raw(raw: &RawRecord) -> Self {
        let entity = non_blank(&raw.entity)
            .or_else(|| non_blank(&raw.subsidiary))
            .or_else(|| non_blank(&raw.company));

        Self {
            date: parse_date(&raw.date),
            account: raw.account.trim().to_string(),
            amount: coerce_amount(&raw.amount),
            side: Side::parse(&raw.entry_type),
            entity,
        }
    }

    /// Type a whole batch.
    pub fn from_raw_batch(rows: &[RawRecord]) -> Vec<Transaction> {
        rows.iter().map(Transaction::from_raw).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(date: &str, account: &str, amount: Value, entry_type: &str) -> RawRecord {
        RawRecord {
            date: date.to_string(),
            account: account.to_string(),
            amount,
            entry_type: entry_type.to_string(),
            ..RawRecord::default()
        }
    }

    #[test]
    fn test_typed_row_happy_path() {
        let t = Transaction::from_raw(&raw("2024-01-05", "Revenue - Consulting", json!(1000), "credit"));
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(t.amount, 1000.0);
        assert_eq!(t.side, Some(Side::Credit));
    }

    #[test]
    fn test_bad_date_degrades_to_none() {
        let t = Transaction::from_raw(&raw("not-a-date", "Cash", json!(50), "debit"));
        assert_eq!(t.date, None);
        assert_eq!(t.amount, 50.0);
    }

    #[test]
    fn test_slash_and_iso_datetime_formats() {
        assert_eq!(parse_date("01/06/2024"), NaiveDate::from_ymd_opt(2024, 1, 6));
        assert_eq!(parse_date("2024-01-06T12:30:00Z"), NaiveDate::from_ymd_opt(2024, 1, 6));
        assert_eq!(parse_date("2024/01/06"), NaiveDate::from_ymd_opt(2024, 1, 6));
    }

    #[test]
    fn test_amount_coercion() {
        assert_eq!(coerce_amount(&json!(12.5)), 12.5);
        assert_eq!(coerce_amount(&json!("$1,200.50")), 1200.5);
        assert_eq!(coerce_amount(&json!("-300")), -300.0);
        assert_eq!(coerce_amount(&json!("n/a")), 0.0);
        assert_eq!(coerce_amount(&Value::Null), 0.0);
    }

    #[test]
    fn test_unknown_type_is_sideless() {
        let t = Transaction::from_raw(&raw("2024-01-05", "Cash", json!(10), "transfer"));
        assert_eq!(t.side, None);
    }

    #[test]
    fn test_entity_synonym_priority() {
        let mut r = raw("2024-01-05", "Cash", json!(10), "debit");
        r.company = Some("C Corp".to_string());
        r.subsidiary = Some("S Sub".to_string());
        assert_eq!(Transaction::from_raw(&r).entity.as_deref(), Some("S Sub"));

        r.entity = Some("E Ltd".to_string());
        assert_eq!(Transaction::from_raw(&r).entity.as_deref(), Some("E Ltd"));

        r.entity = Some("   ".to_string());
        // blank counts as absent, falls through to subsidiary
        assert_eq!(Transaction::from_raw(&r).entity.as_deref(), Some("S Sub"));
    }
}
