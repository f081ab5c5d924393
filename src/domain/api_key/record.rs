//! API key records as returned by the admin endpoints

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const PREVIEW_PREFIX_LEN: usize = 8;
const PREVIEW_SUFFIX_LEN: usize = 4;

/// Opaque API key identifier.
///
/// The backend hands out integer ids today; string ids are accepted as well
/// so the console never depends on the representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiKeyId {
    Numeric(i64),
    Text(String),
}

impl ApiKeyId {
    /// Parse an id typed by the operator. Integers become numeric ids.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        raw.parse::<i64>()
            .map(Self::Numeric)
            .unwrap_or_else(|_| Self::Text(raw.to_string()))
    }
}

impl From<i64> for ApiKeyId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ApiKeyId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl std::fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{}", id),
            Self::Text(id) => write!(f, "{}", id),
        }
    }
}

/// An API key as listed by `GET /admin/apikeys`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub id: ApiKeyId,
    pub name: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ApiKeyRecord {
    pub fn new(id: impl Into<ApiKeyId>, name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            key: key.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Key preview shown while the key is hidden: first 8 and last 4 characters
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.key.chars().collect();

        if chars.len() <= PREVIEW_PREFIX_LEN + PREVIEW_SUFFIX_LEN {
            return "*".repeat(chars.len().max(4));
        }

        let prefix: String = chars[..PREVIEW_PREFIX_LEN].iter().collect();
        let suffix: String = chars[chars.len() - PREVIEW_SUFFIX_LEN..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }

    /// Creation time in local time, `N/A` when absent or unparseable
    pub fn created_display(&self) -> String {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// Accepts RFC 3339 and the naive ISO form the backend emits (treated as UTC)
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Body of `POST /admin/apikeys`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

impl CreateApiKeyRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reply of `POST /admin/apikeys`; only the name is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedApiKey {
    #[serde(default)]
    pub name: Option<String>,
}

impl CreatedApiKey {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unnamed")
    }
}
