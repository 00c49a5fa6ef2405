//! REST client for the hosting backend
//!
//! `ApiClient` owns one reusable `reqwest::Client` and the bearer token of the
//! current session. Endpoint methods live in one submodule per concern and
//! all funnel through the request helpers below, which map non-success
//! statuses onto [`ApiError`].

mod auth;
mod backups;
mod billing;
mod collaborators;
mod domains;
mod instances;
mod metrics;
mod tickets;
pub mod types;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};

use types::ListEnvelope;

/// Client for the hosting backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL without trailing slash
    base_url: String,

    /// Bearer token of the current session (if logged in)
    token: Option<String>,

    /// Reusable HTTP client
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url().to_string(),
            token: None,
            http,
        })
    }

    /// Create a client for a base URL with default settings
    pub fn with_base_url(base_url: impl Into<String>) -> ApiResult<Self> {
        let config = Config {
            api_url: base_url.into(),
            ..Config::default()
        };
        Self::new(&config)
    }

    /// Attach (or replace) the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Builder-style variant of [`ApiClient::set_token`]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request, attaching the bearer token when present
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        trace!("{method} {url}");

        let mut request = self.http.request(method, url);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        request
    }

    /// Fail fast for endpoints that need a session
    fn require_token(&self) -> ApiResult<()> {
        if self.token.is_none() {
            return Err(ApiError::NotAuthenticated);
        }
        Ok(())
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("request failed with {status}: {body}");

        Err(ApiError::from_status(status, &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::decode(response).await
    }

    /// GET a list endpoint, accepting bare arrays and `items`/`data` envelopes
    pub(crate) async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let envelope: ListEnvelope<T> = self.get(path).await?;
        Ok(envelope.into_vec())
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        Self::decode(response).await
    }

    /// POST without a meaningful response body
    pub(crate) async fn post_empty(&self, path: &str) -> ApiResult<()> {
        self.send(self.request(Method::POST, path)).await?;
        Ok(())
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PUT, path).json(body))
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}
