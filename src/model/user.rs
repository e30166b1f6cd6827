use serde::{Deserialize, Serialize};

/// The identity of the logged-in user as returned by `/auth/profile` and `/auth/login`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "super::deserialize_optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    /// The name to greet the user with: full name when known, otherwise the email.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

/// The `data` of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_data() {
        let json = r#"{"token":"abc","user":{"id":7,"email":"a@b.c","full_name":"Ada"}}"#;
        let data: AuthData = serde_json::from_str(json).unwrap();
        assert_eq!(data.token.as_deref(), Some("abc"));
        let user = data.user.unwrap();
        assert_eq!(user.id.as_deref(), Some("7"));
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User {
            id: None,
            email: "a@b.c".into(),
            full_name: Some("  ".into()),
        };
        assert_eq!(user.display_name(), "a@b.c");
    }
}
