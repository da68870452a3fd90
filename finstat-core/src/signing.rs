//! Debit/credit sides and the two summation conventions.
//!
//! The engine deliberately carries TWO conventions:
//! - `Netting`: increasing-side sum minus decreasing-side sum (balance sheet
//!   assets/liabilities/equity, DSO ending AR).
//! - `OneSided`: sum only the increasing side, ignore the other (P&L revenue
//!   and expenses, every revenue KPI).
//!
//! They are selected per statement/KPI and must not be collapsed into one
//! rule: a credit against an expense account is negated under netting but
//! simply ignored under one-sided summation.

use serde::{Deserialize, Serialize};

/// Which side of the ledger an entry posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    /// Case-insensitive parse; anything other than debit/credit is `None`.
    pub fn parse(raw: &str) -> Option<Side> {
        match raw.trim().to_lowercase().as_str() {
            "debit" => Some(Side::Debit),
            "credit" => Some(Side::Credit),
            _ => None,
        }
    }
}

/// How amounts on the two sides combine into a category total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumPolicy {
    /// increasing − decreasing
    Netting,
    /// increasing only; the other side contributes nothing
    OneSided,
}

/// Signed contribution of one entry to a category whose balance grows on
/// `increasing`.
pub fn signed_amount(increasing: Side, entry: Side, amount: f64, policy: SumPolicy) -> f64 {
    if entry == increasing {
        amount
    } else {
        match policy {
            SumPolicy::Netting => -amount,
            SumPolicy::OneSided => 0.0,
        }
    }
}
