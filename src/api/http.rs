//! Implements the `Gateway` trait with `reqwest` against a real finance API.

use crate::api::{ApiRequest, Envelope, Gateway, Method};
use crate::Result;
use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Sends requests over HTTP(S). No retries, no timeout and no cancellation: a request either
/// produces an envelope or an error.
pub struct HttpGateway {
    base: Url,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self { base, client })
    }

    /// Joins the base URL and the request path, then appends the query parameters.
    fn url(&self, request: &ApiRequest) -> Result<Url> {
        let joined = format!(
            "{}{}",
            self.base.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url = Url::parse(&joined).with_context(|| format!("Invalid request URL {joined}"))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn send(&mut self, request: ApiRequest) -> Result<Envelope> {
        let url = self.url(&request)?;
        debug!("{:?} {}", request.method, url.path());

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(credential) = request.credential.as_deref() {
            builder = builder.bearer_auth(credential);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Unable to connect to the finance API at {url}"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .context("Unable to read the API response body")?;
        trace!("{status} {text}");

        serde_json::from_str(&text).with_context(|| {
            format!("The API answered {status} with a body that is not a JSON envelope")
        })
    }
}
