//! FX rate lookup with a deterministic offline fallback.
//!
//! Rates come from exchangerate-api.com with a bounded timeout; any failure
//! (network, non-200, bad body) resolves to a static fallback table tagged
//! `source: "fallback"`. Fetch failures never propagate — only a conversion
//! to a currency absent from the table is a caller-visible error.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const API_BASE: &str = "https://api.exchangerate-api.com/v4";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
pub struct FxRates {
    pub base: String,
    pub date: String,
    pub rates: BTreeMap<String, f64>,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FxConversion {
    pub original_amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub converted_amount: f64,
    pub rate: f64,
    pub date: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    base: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

fn fallback_rates(base: &str, date: Option<&str>, today: NaiveDate) -> FxRates {
    let rates = BTreeMap::from([
        ("USD".to_string(), 1.0),
        ("EUR".to_string(), 0.92),
        ("GBP".to_string(), 0.79),
        ("JPY".to_string(), 149.50),
        ("CNY".to_string(), 7.25),
        ("AUD".to_string(), 1.52),
        ("CAD".to_string(), 1.35),
        ("CHF".to_string(), 0.88),
    ]);
    FxRates {
        base: base.to_string(),
        date: date
            .map(str::to_string)
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        rates,
        source: "fallback".to_string(),
    }
}

async fn fetch(url: &str) -> Option<ApiResponse> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .ok()?;
    let resp = client.get(url).send().await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    resp.json().await.ok()
}

/// Current rates for `base`. Never fails: falls back to the static table.
pub async fn current_rates(base: &str, today: NaiveDate) -> FxRates {
    let url = format!("{API_BASE}/latest/{base}");
    match fetch(&url).await {
        Some(api) if !api.rates.is_empty() => FxRates {
            base: if api.base.is_empty() { base.to_string() } else { api.base },
            date: if api.date.is_empty() {
                today.format("%Y-%m-%d").to_string()
            } else {
                api.date
            },
            rates: api.rates,
            source: "exchangerate-api.com".to_string(),
        },
        _ => fallback_rates(base, None, today),
    }
}

/// Historical rates for `base` on `date` (YYYY-MM-DD). Never fails.
pub async fn historical_rates(base: &str, date: &str, today: NaiveDate) -> FxRates {
    let url = format!("{API_BASE}/history/{base}/{date}");
    match fetch(&url).await {
        Some(api) if !api.rates.is_empty() => FxRates {
            base: if api.base.is_empty() { base.to_string() } else { api.base },
            date: date.to_string(),
            rates: api.rates,
            source: "exchangerate-api.com".to_string(),
        },
        _ => fallback_rates(base, Some(date), today),
    }
}

/// Convert an amount between currencies at current or historical rates.
pub async fn convert(
    amount: f64,
    from: &str,
    to: &str,
    date: Option<&str>,
    today: NaiveDate,
) -> Result<FxConversion> {
    let rates = match date {
        Some(d) => historical_rates(from, d, today).await,
        None => current_rates(from, today).await,
    };

    let Some(rate) = rates.rates.get(to).copied() else {
        bail!("no rate for currency {to} (base {from}, source {})", rates.source);
    };

    Ok(FxConversion {
        original_amount: amount,
        from_currency: from.to_string(),
        to_currency: to.to_string(),
        converted_amount: (amount * rate * 100.0).round() / 100.0,
        rate,
        date: rates.date,
    })
}
