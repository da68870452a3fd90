//! Account classification: keyword-substring matching against a configurable
//! chart of categories.
//!
//! This is a stand-in for a real chart-of-accounts taxonomy: an account name
//! matches a category when any of the category's keywords appears inside it,
//! case-insensitively and untokenized ("Accounts Receivable" matches
//! "Intercompany Accounts Receivable - AU"). An account may match several
//! categories; an account matching none simply contributes to no total.

use serde::{Deserialize, Serialize};

use crate::signing::Side;

/// The five statement classes. The class decides which side increases the
/// category balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryClass {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl CategoryClass {
    /// Assets and expenses grow on debit; the rest grow on credit.
    pub fn increasing_side(self) -> Side {
        match self {
            CategoryClass::Asset | CategoryClass::Expense => Side::Debit,
            CategoryClass::Liability | CategoryClass::Equity | CategoryClass::Revenue => {
                Side::Credit
            }
        }
    }
}

/// One named category: a display name, the keywords that match it, and its
/// statement class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub keywords: Vec<String>,
    pub class: CategoryClass,
}

impl CategoryDef {
    pub fn new(name: &str, keywords: &[&str], class: CategoryClass) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            class,
        }
    }

    /// Single-keyword category where the keyword is the name itself, the
    /// common case in the default chart.
    pub fn named(name: &str, class: CategoryClass) -> Self {
        Self::new(name, &[name], class)
    }

    pub fn matches(&self, account: &str) -> bool {
        let account = account.to_lowercase();
        self.keywords
            .iter()
            .any(|k| account.contains(&k.to_lowercase()))
    }
}

/// All categories whose keyword lists the account name overlaps.
pub fn classify<'a>(account: &str, defs: &'a [CategoryDef]) -> Vec<&'a CategoryDef> {
    defs.iter().filter(|d| d.matches(account)).collect()
}

/// A cash-flow activity group: rows qualify only when the account contains
/// "cash" AND one of the group keywords (a conjunction of two matches).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

impl ActivityGroup {
    fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn matches(&self, account: &str) -> bool {
        let lower = account.to_lowercase();
        lower.contains("cash")
            && self
                .keywords
                .iter()
                .any(|k| lower.contains(&k.to_lowercase()))
    }
}

/// The full classification configuration: statement categories, cash-flow
/// activity groups, and the keyword sets the KPI calculators filter with.
/// `Default` carries the stock chart; tests and callers may substitute their
/// own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub assets: Vec<CategoryDef>,
    pub liabilities: Vec<CategoryDef>,
    pub equity: Vec<CategoryDef>,
    pub revenue: Vec<CategoryDef>,
    pub expenses: Vec<CategoryDef>,
    pub activities: Vec<ActivityGroup>,
    /// Accounts receivable matcher for AR aging and DSO.
    pub receivables: CategoryDef,
    /// Broad revenue matcher for the revenue KPIs (wider than the statement
    /// revenue categories on purpose: one keyword set, not per-line items).
    pub revenue_filter: CategoryDef,
    /// Broad expense matcher used by the entity breakdown.
    pub expense_filter: CategoryDef,
}

impl Default for Chart {
    fn default() -> Self {
        use CategoryClass::*;
        Self {
            assets: vec![
                CategoryDef::named("Cash", Asset),
                CategoryDef::named("Accounts Receivable", Asset),
                CategoryDef::named("Inventory", Asset),
                CategoryDef::named("Property", Asset),
                CategoryDef::named("Equipment", Asset),
                CategoryDef::named("Investments", Asset),
            ],
            liabilities: vec![
                CategoryDef::named("Accounts Payable", Liability),
                CategoryDef::named("Loans", Liability),
                CategoryDef::named("Debt", Liability),
                CategoryDef::named("Accrued Expenses", Liability),
            ],
            equity: vec![
                CategoryDef::named("Capital", Equity),
                CategoryDef::named("Retained Earnings", Equity),
                CategoryDef::named("Equity", Equity),
            ],
            revenue: vec![
                CategoryDef::named("Revenue", Revenue),
                CategoryDef::named("Sales", Revenue),
                CategoryDef::named("Income", Revenue),
                CategoryDef::named("Interest Income", Revenue),
            ],
            expenses: vec![
                CategoryDef::named("Cost of Goods Sold", Expense),
                CategoryDef::named("Operating Expenses", Expense),
                CategoryDef::named("Salaries", Expense),
                CategoryDef::named("Rent", Expense),
                CategoryDef::named("Utilities", Expense),
                CategoryDef::named("Marketing", Expense),
                CategoryDef::named("Depreciation", Expense),
            ],
            activities: vec![
                ActivityGroup::new(
                    "operating_activities",
                    &["revenue", "sales", "operating", "expenses"],
                ),
                ActivityGroup::new(
                    "investing_activities",
                    &["investment", "property", "equipment"],
                ),
                ActivityGroup::new(
                    "financing_activities",
                    &["loan", "debt", "capital", "equity"],
                ),
            ],
            receivables: CategoryDef::new(
                "Accounts Receivable",
                &["accounts receivable", "receivable", "ar"],
                Asset,
            ),
            revenue_filter: CategoryDef::new(
                "Revenue",
                &["revenue", "sales", "income"],
                Revenue,
            ),
            expense_filter: CategoryDef::new(
                "Expenses",
                &["expense", "cost", "salary", "rent", "utilities"],
                Expense,
            ),
        }
    }
}
