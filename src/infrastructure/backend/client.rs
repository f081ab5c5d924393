use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::{CreateApiKeyRequest, Credentials};

#[cfg(test)]
use mockall::automock;

const TOKEN_PATH: &str = "/admin/token";
const HEALTH_PATH: &str = "/";
const API_KEYS_PATH: &str = "/admin/apikeys";
const PROXY_PATH: &str = "/nms/proxy";

/// Failure before any HTTP response was received
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ReplyBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }

        match serde_json::from_slice(bytes) {
            Ok(json) => Self::Json(json),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

/// Status and body of a backend response, unclassified
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl BackendReply {
    pub fn new(status: u16, body: ReplyBody) -> Self {
        Self { status, body }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, ReplyBody::Json(body))
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, ReplyBody::Empty)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }

    /// The `detail` field of a JSON error body, rendered as text
    pub fn detail(&self) -> Option<String> {
        let ReplyBody::Json(body) = &self.body else {
            return None;
        };

        match body.get("detail")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::String(_) | Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Calls against the NMSSentinel backend.
///
/// Implementations report every HTTP response as a reply, whatever the
/// status; only transport failures are errors.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// `POST /admin/token` with a form-encoded body
    async fn request_token(&self, credentials: &Credentials)
        -> Result<BackendReply, TransportError>;

    /// `GET /`
    async fn health(&self) -> Result<BackendReply, TransportError>;

    /// `GET /admin/apikeys`
    async fn list_api_keys(&self, token: &str) -> Result<BackendReply, TransportError>;

    /// `POST /admin/apikeys` with a JSON body
    async fn create_api_key(
        &self,
        token: &str,
        request: &CreateApiKeyRequest,
    ) -> Result<BackendReply, TransportError>;

    /// `GET /nms/proxy`
    async fn proxy(&self, token: &str) -> Result<BackendReply, TransportError>;
}

/// Backend client using reqwest
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        request
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<BackendReply, TransportError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        debug!(status, bytes = bytes.len(), "Backend responded");

        Ok(BackendReply::new(status, ReplyBody::from_bytes(&bytes)))
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn request_token(
        &self,
        credentials: &Credentials,
    ) -> Result<BackendReply, TransportError> {
        debug!(username = %credentials.username, "POST {}", TOKEN_PATH);

        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        self.send(self.client.post(self.url(TOKEN_PATH)).form(&form))
            .await
    }

    async fn health(&self) -> Result<BackendReply, TransportError> {
        debug!("GET {}", HEALTH_PATH);
        self.send(self.client.get(self.url(HEALTH_PATH))).await
    }

    async fn list_api_keys(&self, token: &str) -> Result<BackendReply, TransportError> {
        debug!("GET {}", API_KEYS_PATH);
        let request = self.authorized(self.client.get(self.url(API_KEYS_PATH)), token);
        self.send(request).await
    }

    async fn create_api_key(
        &self,
        token: &str,
        request: &CreateApiKeyRequest,
    ) -> Result<BackendReply, TransportError> {
        debug!(name = %request.name, "POST {}", API_KEYS_PATH);
        let builder = self
            .client
            .post(self.url(API_KEYS_PATH))
            .bearer_auth(token)
            .json(request);
        self.send(builder).await
    }

    async fn proxy(&self, token: &str) -> Result<BackendReply, TransportError> {
        debug!("GET {}", PROXY_PATH);
        let request = self.authorized(self.client.get(self.url(PROXY_PATH)), token);
        self.send(request).await
    }
}
