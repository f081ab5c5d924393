//! Domain layer - Console state and the types it is made of

pub mod api_key;
pub mod error;
pub mod log;
pub mod session;
pub mod state;
pub mod view;

pub use api_key::{ApiKeyId, ApiKeyRecord, CreateApiKeyRequest, CreatedApiKey};
pub use error::ConsoleError;
pub use log::{LogEntry, LogRecorder};
pub use session::{Credentials, FormInputs, Session};
pub use state::ConsoleState;
pub use view::{Action, LoadingFlags, VisibilityMap};
