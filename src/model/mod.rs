//! Types that represent the resources of the finance API, such as `Transaction` and `Budget`.
//!
//! These are transient, unvalidated copies of what the API returned. Nothing here is persisted.

mod amount;
mod budget;
mod category;
mod report;
mod transaction;
mod user;

pub use amount::{Amount, AmountError};
pub use budget::{Budget, NewBudget, Period};
pub use category::{Category, CategoryRef};
pub use report::{CategoryTotal, Dashboard, MonthSummary, Report, ReportKind, ReportQuery};
pub(crate) use report::RawReport;
pub use transaction::{NewTransaction, Transaction, TransactionFilter, TransactionList};
pub use user::{AuthData, User};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Whether money came in or went out. Categories and transactions both carry one.
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
pub enum EntryKind {
    Income,
    #[default]
    Expense,
}

serde_plain::derive_display_from_serialize!(EntryKind);
serde_plain::derive_fromstr_from_deserialize!(EntryKind);

/// The API is not consistent about identifiers: UUID strings in most places, integers in
/// others. Both are held as strings.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

/// Same as `deserialize_id` but tolerates a missing or `null` id.
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {other}"
        ))),
    }
}

/// Dates come back either as `YYYY-MM-DD` or as a full ISO-8601 timestamp. Only the calendar
/// date is of interest.
pub fn parse_api_date(s: &str) -> Option<NaiveDate> {
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_plain() {
        assert_eq!(EntryKind::Income.to_string(), "income");
        assert_eq!("expense".parse::<EntryKind>().unwrap(), EntryKind::Expense);
        assert!("transfer".parse::<EntryKind>().is_err());
    }

    #[test]
    fn test_parse_api_date() {
        let expected = NaiveDate::from_ymd_opt(2025, 10, 18).unwrap();
        assert_eq!(parse_api_date("2025-10-18"), Some(expected));
        assert_eq!(parse_api_date("2025-10-18T04:00:00.000Z"), Some(expected));
        assert_eq!(parse_api_date("18/10/2025"), None);
        assert_eq!(parse_api_date("2025"), None);
    }
}
