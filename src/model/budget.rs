use crate::model::{Amount, CategoryRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How often a budget resets.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

serde_plain::derive_display_from_serialize!(Period);
serde_plain::derive_fromstr_from_deserialize!(Period);

/// A spending limit over a date range, with the amount spent so far as computed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "super::deserialize_optional_id")]
    pub category_id: Option<String>,
    #[serde(alias = "budgetAmount")]
    pub amount: Amount,
    #[serde(default, alias = "spentAmount")]
    pub spent: Amount,
    pub period: Period,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, rename = "Category")]
    pub category: Option<CategoryRef>,
}

impl Budget {
    /// The category name, or `None` for an overall budget.
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|name| !name.is_empty())
    }

    pub fn start(&self) -> Option<NaiveDate> {
        super::parse_api_date(&self.start_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        super::parse_api_date(&self.end_date)
    }
}

/// The body of `POST /budgets`, built from the budget form. A `None` category means an overall
/// budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category_id: Option<String>,
    pub amount: Option<Amount>,
    pub period: String,
    pub start_date: String,
    pub end_date: String,
}
