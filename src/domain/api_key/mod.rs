//! API Key domain
//!
//! Records listed by the admin API plus the request/response shapes used
//! when creating a key.

mod record;

pub use record::{ApiKeyId, ApiKeyRecord, CreateApiKeyRequest, CreatedApiKey};
