//! Aggregate console state owned by the console service

use super::api_key::{ApiKeyId, ApiKeyRecord};
use super::log::LogRecorder;
use super::session::{FormInputs, Session};
use super::view::{LoadingFlags, VisibilityMap};

/// Everything the presentation layer renders.
///
/// Only the console service mutates this; renderers get a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ConsoleState {
    pub session: Session,
    pub inputs: FormInputs,
    pub api_keys: Vec<ApiKeyRecord>,
    pub health: Option<String>,
    pub proxy_response: Option<String>,
    pub loading: LoadingFlags,
    pub visibility: VisibilityMap,
    pub log: LogRecorder,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: LogRecorder) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Clear the token and everything that was only valid under it.
    ///
    /// Loading flags are left alone: each in-flight call clears its own.
    pub fn reset_session(&mut self) {
        self.session.clear();
        self.inputs.clear();
        self.api_keys.clear();
        self.health = None;
        self.proxy_response = None;
        self.visibility.clear();
    }

    pub fn find_key(&self, id: &ApiKeyId) -> Option<&ApiKeyRecord> {
        self.api_keys.iter().find(|k| &k.id == id)
    }
}
