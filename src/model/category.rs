use crate::model::EntryKind;
use serde::{Deserialize, Serialize};

/// A transaction category. Read-only from the client's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// The category embedded in a transaction or budget (`"Category": {...}`). Any part of it may
/// be missing, and for an overall budget the name is `null`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default, deserialize_with = "super::deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<EntryKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_category() {
        let json = r#"[{"id":"c1","name":"Salary","type":"income","is_default":true},
                       {"id":2,"name":"Rent","type":"expense"}]"#;
        let categories: Vec<Category> = serde_json::from_str(json).unwrap();
        assert_eq!(categories[0], Category::new("c1", "Salary", EntryKind::Income));
        assert_eq!(categories[1].id, "2");
    }

    #[test]
    fn test_category_ref_with_nulls() {
        let r: CategoryRef = serde_json::from_str(r#"{"name":null,"type":null}"#).unwrap();
        assert_eq!(r, CategoryRef::default());
    }
}
