//! finstat-ingest: CSV decoding into raw transaction records.
//!
//! The boundary is strict about shape and lenient about content: a file
//! missing one of the required columns (date, account, amount, type) is
//! rejected with the missing names listed, but individual data rows are
//! never rejected — bad fields degrade inside finstat-core instead.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

use finstat_core::RawRecord;

const REQUIRED_COLUMNS: [&str; 4] = ["date", "account", "amount", "type"];

/// Column positions resolved from the header row, case-insensitively.
#[derive(Debug, Default)]
struct ColumnMap {
    date: Option<usize>,
    account: Option<usize>,
    amount: Option<usize>,
    entry_type: Option<usize>,
    entity: Option<usize>,
    subsidiary: Option<usize>,
    company: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut map = ColumnMap::default();
        for (i, name) in headers.iter().enumerate() {
            match name.trim().to_lowercase().as_str() {
                "date" => map.date = Some(i),
                "account" => map.account = Some(i),
                "amount" => map.amount = Some(i),
                "type" => map.entry_type = Some(i),
                "entity" => map.entity = Some(i),
                "subsidiary" => map.subsidiary = Some(i),
                "company" => map.company = Some(i),
                _ => {}
            }
        }

        let present = [map.date, map.account, map.amount, map.entry_type];
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .zip(present)
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            bail!("missing required columns: {}", missing.join(", "));
        }
        Ok(map)
    }
}

fn field(record: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i))
        .unwrap_or("")
        .trim()
        .to_string()
}

fn optional_field(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    let s = field(record, idx);
    (!s.is_empty()).then_some(s)
}

/// Parse transaction CSV from any reader. Header row required; extra
/// columns are ignored; short rows degrade field-by-field.
pub fn parse_csv_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.context("reading CSV row")?;
        // skip fully blank trailing rows
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(RawRecord {
            date: field(&record, columns.date),
            account: field(&record, columns.account),
            amount: Value::String(field(&record, columns.amount)),
            entry_type: field(&record, columns.entry_type),
            entity: optional_field(&record, columns.entity),
            subsidiary: optional_field(&record, columns.subsidiary),
            company: optional_field(&record, columns.company),
        });
    }
    Ok(rows)
}

/// Parse a transaction CSV file from disk.
pub fn parse_csv_path(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_csv_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstat_core::Transaction;

    #[test]
    fn test_parse_basic_csv() {
        let data = "\
date,account,amount,type,entity
2024-01-05,Revenue - Consulting,1000,credit,A
2024-01-06,Cash,\"$1,500.00\",debit,A
";
        let rows = parse_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].account, "Revenue - Consulting");
        assert_eq!(rows[0].entity.as_deref(), Some("A"));

        let txns = Transaction::from_raw_batch(&rows);
        assert_eq!(txns[1].amount, 1500.0);
    }

    #[test]
    fn test_headers_case_insensitive_and_extra_columns_ignored() {
        let data = "Date,Account,AMOUNT,Type,Memo\n2024-01-05,Cash,10,debit,ignored\n";
        let rows = parse_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2024-01-05");
    }

    #[test]
    fn test_missing_required_columns_rejected() {
        let data = "date,account\n2024-01-05,Cash\n";
        let err = parse_csv_reader(data.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("amount"), "unexpected error: {msg}");
        assert!(msg.contains("type"), "unexpected error: {msg}");
    }

    #[test]
    fn test_bad_rows_kept_and_degraded_not_dropped() {
        let data = "\
date,account,amount,type
not-a-date,Cash,abc,debit
2024-01-05,Cash,50,transfer
";
        let rows = parse_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let txns = Transaction::from_raw_batch(&rows);
        assert_eq!(txns[0].date, None);
        assert_eq!(txns[0].amount, 0.0);
        assert_eq!(txns[1].side, None);
    }

    #[test]
    fn test_blank_trailing_rows_skipped() {
        let data = "date,account,amount,type\n2024-01-05,Cash,10,debit\n,,,\n";
        let rows = parse_csv_reader(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_subsidiary_column_flows_through() {
        let data = "date,account,amount,type,subsidiary\n2024-01-05,Cash,10,debit,Acme AU\n";
        let rows = parse_csv_reader(data.as_bytes()).unwrap();
        let txns = Transaction::from_raw_batch(&rows);
        assert_eq!(txns[0].entity.as_deref(), Some("Acme AU"));
    }
}
