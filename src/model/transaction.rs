use crate::model::{Amount, CategoryRef, EntryKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single income or expense entry as listed by `/transactions` or `/dashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub amount: Amount,
    /// Either `YYYY-MM-DD` or an ISO-8601 timestamp.
    #[serde(rename = "transaction_date")]
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "Category")]
    pub category: Option<CategoryRef>,
}

impl Transaction {
    /// The calendar date, when the API sent something recognizable.
    pub fn day(&self) -> Option<NaiveDate> {
        super::parse_api_date(&self.date)
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(|c| c.name.as_deref())
    }
}

/// The `data` of `GET /transactions`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionList {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// The body of `POST /transactions`, built from the transaction form.
///
/// `amount` is `None` when the typed text could not be parsed; it is sent as `null` and the API
/// decides what to do with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub kind: String,
    pub category_id: String,
    pub amount: Option<Amount>,
    pub transaction_date: String,
    pub description: String,
}

/// Query parameters accepted by `GET /transactions`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub kind: Option<EntryKind>,
    pub category_id: Option<String>,
    pub limit: Option<u32>,
}

impl TransactionFilter {
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(kind) = self.kind {
            query.push(("type".to_string(), kind.to_string()));
        }
        if let Some(category_id) = self.category_id.as_deref().filter(|s| !s.is_empty()) {
            query.push(("category_id".to_string(), category_id.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_deserialize_transaction() {
        let json = r#"{
            "id": "t1",
            "type": "expense",
            "amount": "42.50",
            "transaction_date": "2025-10-02T00:00:00.000Z",
            "description": null,
            "created_at": "2025-10-02T10:00:00.000Z",
            "Category": {"id": "c9", "name": "Food & Dining", "type": "expense"}
        }"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.kind, EntryKind::Expense);
        assert_eq!(t.amount.value(), Decimal::new(4250, 2));
        assert_eq!(t.day(), NaiveDate::from_ymd_opt(2025, 10, 2));
        assert_eq!(t.category_name(), Some("Food & Dining"));
        assert!(t.description.is_none());
    }

    #[test]
    fn test_deserialize_transaction_without_category() {
        let json = r#"{"id":1,"type":"income","amount":10,"transaction_date":"2025-01-01","Category":null}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.id, "1");
        assert_eq!(t.category_name(), None);
    }

    #[test]
    fn test_new_transaction_unparsed_amount_is_null() {
        let body = NewTransaction {
            kind: "expense".into(),
            category_id: "c1".into(),
            amount: None,
            transaction_date: "2025-10-18".into(),
            description: String::new(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["amount"].is_null());
        assert_eq!(json["type"], "expense");
    }

    #[test]
    fn test_filter_query() {
        assert!(TransactionFilter::default().query().is_empty());
        let filter = TransactionFilter {
            kind: Some(EntryKind::Income),
            category_id: Some(String::new()),
            limit: Some(10),
        };
        assert_eq!(
            filter.query(),
            vec![
                ("type".to_string(), "income".to_string()),
                ("limit".to_string(), "10".to_string())
            ]
        );
    }
}
