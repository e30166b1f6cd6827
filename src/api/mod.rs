//! Outbound calls to the finance API.
//!
//! Every call goes through the `Gateway` trait, which knows nothing about the resources; the
//! typed calls live in `FinanceApi`. Two gateways exist: `HttpGateway` talks to a real server,
//! `TestGateway` keeps a fake API in memory.

mod finance;
mod http;
mod test_gateway;

use crate::{Config, Result};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

pub use finance::FinanceApi;
pub use http::HttpGateway;
pub use test_gateway::{TestGateway, TestGatewayHandle, DEMO_EMAIL, DEMO_PASSWORD};

/// The environment variable that switches the binary to the in-memory API.
pub const TEST_MODE_ENV: &str = "FIN_IN_TEST_MODE";

/// Chooses between the real finance API and the in-memory one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// `Mode::Test` when `FIN_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the gateway for `mode`.
pub fn gateway(config: &Config, mode: Mode) -> Result<Box<dyn Gateway>> {
    Ok(match mode {
        Mode::Http => Box::new(HttpGateway::new(config.api_url().clone())?),
        Mode::Test => Box::new(TestGateway::default()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// One outbound call. `path` is relative to the API base URL and starts with `/`.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub credential: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            credential: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).context("Unable to serialize request body")?);
        Ok(self)
    }

    pub fn bearer(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

impl Debug for ApiRequest {
    /// Request bodies may hold passwords and the credential is a secret; neither is printed.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("authorized", &self.credential.is_some())
            .finish()
    }
}

/// The `{ success, message?, data? }` wrapper that every API response shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn ok(data: serde_json::Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Branches on the success flag. A success envelope whose `data` does not fit `T` is a parse
    /// error; a failure envelope is a value, not an error.
    pub fn into_reply<T: DeserializeOwned>(self) -> Result<Reply<T>> {
        if !self.success {
            return Ok(Reply::Failure {
                message: self.message,
            });
        }
        let data = serde_json::from_value(self.data.unwrap_or(serde_json::Value::Null))
            .context("Unable to parse the data of the API response")?;
        Ok(Reply::Success {
            data,
            message: self.message,
        })
    }
}

/// The outcome of a call that reached the API and was parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success { data: T, message: Option<String> },
    Failure { message: Option<String> },
}

impl<T> Reply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Success { data, message } => Reply::Success {
                data: f(data),
                message,
            },
            Reply::Failure { message } => Reply::Failure { message },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success { .. })
    }
}

/// Sends requests to the finance API. Implementations attach `Content-Type: application/json`
/// to every request and `Authorization: Bearer` when the request carries a credential, and parse
/// every response body as an `Envelope` regardless of the transport status.
#[async_trait::async_trait]
pub trait Gateway: Send {
    async fn send(&mut self, request: ApiRequest) -> Result<Envelope>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_reply_success() {
        let envelope = Envelope::ok(json!([1, 2, 3]), "ok");
        let reply: Reply<Vec<u8>> = envelope.into_reply().unwrap();
        assert_eq!(
            reply,
            Reply::Success {
                data: vec![1, 2, 3],
                message: Some("ok".into())
            }
        );
    }

    #[test]
    fn test_into_reply_failure_ignores_data_shape() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"success":false,"message":"Invalid credentials"}"#).unwrap();
        let reply: Reply<Vec<u8>> = envelope.into_reply().unwrap();
        assert_eq!(
            reply,
            Reply::Failure {
                message: Some("Invalid credentials".into())
            }
        );
    }

    #[test]
    fn test_into_reply_bad_data_is_error() {
        let envelope = Envelope::ok(json!({"not": "a list"}), "ok");
        assert!(envelope.into_reply::<Vec<u8>>().is_err());
    }

    #[test]
    fn test_into_reply_missing_data_for_unit() {
        let envelope: Envelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(envelope.into_reply::<()>().unwrap().is_success());
    }

    #[test]
    fn test_request_debug_hides_secrets() {
        let request = ApiRequest::post("/auth/login")
            .json(&json!({"password": "hunter2"}))
            .unwrap()
            .bearer("secret-token");
        let debug = format!("{request:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("/auth/login"));
    }
}
