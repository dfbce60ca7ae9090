//! Skyfare backend API client.
//!
//! Every feature of the front-end is a thin wrapper over the backend HTTP
//! API. This crate owns the wire types and the one place where requests are
//! built, authenticated and their failures normalized.
//!
//! # Usage
//!
//! ```ignore
//! use skyfare_client::ApiClient;
//!
//! let client = ApiClient::new("http://localhost:8000/api/v1");
//! let user = client.me("access-token").await?;
//! let airlines = client.airlines("access-token").await?;
//! ```

mod api;
pub mod model;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use skyfare_core::ServiceError;

pub use model::*;

// ── Error ───────────────────────────────────────────────────────────

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is the body's `detail` field when
    /// present, otherwise the HTTP status text.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of a server error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Server { status, message } => ServiceError::Upstream { status, message },
            ApiError::Network(err) => ServiceError::Unavailable(format!("backend unreachable: {}", err)),
            ApiError::Auth(m) => ServiceError::Unauthorized(m),
            ApiError::Decode(m) => ServiceError::Internal(m),
        }
    }
}

/// Reason phrase for a status code ("Unauthorized", "Not Found", ...).
pub fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
        .to_string()
}

/// Normalize an error response into a single message: a non-empty `detail`
/// field of a JSON body wins, otherwise the HTTP status text.
pub fn error_message(status: u16, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("detail")? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        });
    detail.unwrap_or_else(|| status_text(status))
}

// ── Credentials ─────────────────────────────────────────────────────

/// Anything that carries an access token usable as a bearer credential.
pub trait BearerCredential {
    fn access_token(&self) -> &str;
}

impl BearerCredential for str {
    fn access_token(&self) -> &str {
        self
    }
}

impl BearerCredential for String {
    fn access_token(&self) -> &str {
        self
    }
}

impl BearerCredential for TokenPair {
    fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl BearerCredential for LoginResult {
    fn access_token(&self) -> &str {
        &self.access_token
    }
}

// ── ApiRequest ──────────────────────────────────────────────────────

/// A request to the backend, relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Append a query parameter (URL-encoded when sent).
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a caller header. Headers are not merged: [`ApiClient::call`] and
    /// [`ApiClient::call_anonymous`] send only their own.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ApiError::Decode(format!("request body: {}", e)))?;
        self.body = Some(bytes);
        Ok(self)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

// ── ApiClient ───────────────────────────────────────────────────────

/// HTTP client for the backend API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client whose requests fail after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticated fetch.
    ///
    /// The request goes out with exactly `Authorization: Bearer <token>` and
    /// `Content-Type: application/json`. Caller headers are replaced as a
    /// whole, never merged with these.
    pub async fn call<T, C>(&self, request: ApiRequest, credential: &C) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        C: BearerCredential + ?Sized,
    {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credential.access_token()))
            .map_err(|_| ApiError::Auth("access token is not a valid header value".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.send(request, headers).await
    }

    /// Unauthenticated fetch (sign-in, sign-up). Sends only the JSON
    /// content type.
    pub async fn call_anonymous<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.send(request, headers).await
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest, headers: HeaderMap) -> Result<T, ApiError> {
        let url = self.url(&request.path);
        tracing::debug!(method = %request.method, url = %url, "backend request");
        if !request.headers.is_empty() {
            tracing::debug!(dropped = request.headers.len(), "caller headers replaced");
        }

        let mut builder = self.http.request(request.method, &url).headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        Self::parse(resp).await
    }

    /// Parse an API response, mapping HTTP errors to `ApiError`.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.bytes().await.unwrap_or_default();
            let message = error_message(code, &body);
            tracing::debug!(status = code, message = %message, "backend error response");
            return Err(ApiError::Server { status: code, message });
        }
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }
}
