//! Transport adapter: the seam between request construction and HTTP.
//!
//! [`RestAdapter`] is the trait the client executes requests through;
//! [`HttpAdapter`] is the production implementation over reqwest. Tests swap
//! in an in-memory implementation instead of standing up a server.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::RegistryConfig;
use crate::{Error, Result};

pub use reqwest::Method;

/// A single REST request: verb, path under the server root, query, body.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: Method,
    /// Absolute path under the server root, e.g.
    /// `/api/model_registry/v1alpha3/registered_models`.
    pub path: String,
    /// Query pairs, already camelCase.
    pub query: Vec<(&'static str, String)>,
    /// JSON body for POST/PATCH.
    pub body: Option<Value>,
}

impl RestRequest {
    /// A GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A POST request carrying a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// A PATCH request carrying a JSON body.
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::PATCH,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Attach query pairs.
    #[must_use]
    pub fn with_query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }
}

/// Status and decoded JSON body of a response.
///
/// The body is [`Value::Null`] when the response had no JSON payload.
#[derive(Debug, Clone)]
pub struct RestResponse {
    pub status: u16,
    pub body: Value,
}

impl RestResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes REST requests against the registry.
#[async_trait]
pub trait RestAdapter: Send + Sync {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse>;
}

/// Production adapter over a reqwest client.
///
/// The resolved base address and the bearer token are fixed at construction;
/// no retries or timeouts are added beyond the transport's defaults.
pub struct HttpAdapter {
    base: Url,
    client: reqwest::Client,
    token: Option<SecretString>,
}

impl HttpAdapter {
    /// Build the adapter from a client configuration.
    ///
    /// Fails with [`Error::Configuration`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base: config.base_url.clone(),
            client,
            token: config.token.clone(),
        })
    }

    /// Resolve a request path against the base address, preserving any path
    /// prefix the base carries.
    fn request_url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }
}

#[async_trait]
impl RestAdapter for HttpAdapter {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse> {
        let url = self.request_url(&request.path);
        debug!(method = %request.method, url = %url, "executing registry request");

        let mut builder = self
            .client
            .request(request.method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| Error::Transport(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(parsed) => parsed,
                // A 2xx response must be JSON; error pages may not be.
                Err(e) if status < 400 => return Err(Error::Serialization(e)),
                Err(_) => Value::Null,
            }
        };
        Ok(RestResponse { status, body })
    }
}
