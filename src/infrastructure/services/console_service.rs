//! Console service - session store and request orchestration
//!
//! Every backend call goes through the same lifecycle: mark the action busy,
//! perform the call, classify the reply, apply the success update or tear
//! the session down on 401, then clear the busy flag. Failures end up in the
//! operator log and are returned as an [`ActionOutcome`]; nothing propagates
//! further.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{
    Action, ApiKeyId, ApiKeyRecord, ConsoleError, ConsoleState, CreateApiKeyRequest,
    CreatedApiKey, Credentials, LogRecorder,
};
use crate::infrastructure::backend::{BackendClient, BackendReply, ReplyBody, TransportError};
use crate::infrastructure::clipboard::Clipboard;

const LOGGED_IN: &str = "Logged in successfully!";
const LOGGED_OUT: &str = "Logged out successfully";
const CREDENTIALS_REQUIRED: &str = "Username and password are required";
const KEY_NAME_REQUIRED: &str = "API key name is required";

/// How a triggered action ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    Failed(ConsoleError),
    /// Not attempted: no session, or the action was already running
    Skipped,
    /// The session changed while the call was in flight; result dropped
    Discarded,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Console service configuration
#[derive(Debug, Clone, Default)]
pub struct ConsoleServiceConfig {
    /// Refuse to start an action whose previous call is still running
    pub reject_concurrent: bool,
    /// Upper bound on retained log entries; unbounded when `None`
    pub log_capacity: Option<usize>,
}

/// Clears an action's loading flag when dropped, on every exit path
struct LoadingGuard {
    state: Arc<RwLock<ConsoleState>>,
    action: Action,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.loading.finish(self.action);
    }
}

/// Owns the console state and performs every operator action against it.
///
/// Cheap to clone; clones share state, so actions of different names can
/// run concurrently on separate tasks.
#[derive(Clone)]
pub struct ConsoleService {
    state: Arc<RwLock<ConsoleState>>,
    backend: Arc<dyn BackendClient>,
    clipboard: Arc<dyn Clipboard>,
    config: ConsoleServiceConfig,
}

impl std::fmt::Debug for ConsoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConsoleService {
    pub fn new(backend: Arc<dyn BackendClient>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self::with_config(backend, clipboard, ConsoleServiceConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn BackendClient>,
        clipboard: Arc<dyn Clipboard>,
        config: ConsoleServiceConfig,
    ) -> Self {
        let log = match config.log_capacity {
            Some(capacity) => LogRecorder::with_capacity(capacity),
            None => LogRecorder::new(),
        };

        Self {
            state: Arc::new(RwLock::new(ConsoleState::with_log(log))),
            backend,
            clipboard,
            config,
        }
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> ConsoleState {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn is_loading(&self, action: Action) -> bool {
        self.read().loading.is_loading(action)
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.write().inputs.username = username.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.write().inputs.password = password.into();
    }

    pub fn set_api_key_name(&self, name: impl Into<String>) {
        self.write().inputs.api_key_name = name.into();
    }

    /// Append an entry to the operator log
    pub fn record(&self, message: impl Into<String>) {
        self.write().log.record(message);
    }

    // ---- Session -------------------------------------------------------

    /// Fill the login form and submit it
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ActionOutcome {
        {
            let mut state = self.write();
            state.inputs.username = username.into();
            state.inputs.password = password.into();
        }
        self.submit_login().await
    }

    /// Exchange the form credentials for a token, then load the key list
    pub async fn submit_login(&self) -> ActionOutcome {
        let credentials = self.read().inputs.credentials();

        if !credentials.is_complete() {
            return self.reject_input(CREDENTIALS_REQUIRED);
        }

        let outcome = self.request_token(&credentials).await;

        // A fresh token triggers the initial key listing once the login
        // call itself has completed.
        if outcome.is_success() {
            self.fetch_keys().await;
        }

        outcome
    }

    async fn request_token(&self, credentials: &Credentials) -> ActionOutcome {
        let Some(_guard) = self.begin(Action::Login) else {
            return ActionOutcome::Skipped;
        };

        let result = self.backend.request_token(credentials).await;

        self.complete(Action::Login, None, result, |state, body| {
            let token = body
                .get("access_token")
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .ok_or_else(|| ConsoleError::format("login response has no access_token"))?;

            state.session.establish(token);
            Ok(LOGGED_IN.to_string())
        })
    }

    /// Drop the session and every piece of state that depended on it.
    ///
    /// Idempotent; each call records one log entry.
    pub fn logout(&self) {
        let mut state = self.write();
        end_session(&mut state);
    }

    // ---- Orchestrated actions -----------------------------------------

    /// `GET /` and store the returned message.
    ///
    /// The endpoint is unauthenticated, so the result is kept even when the
    /// session changes while the call is in flight.
    pub async fn check_health(&self) -> ActionOutcome {
        let Some(_guard) = self.begin(Action::Health) else {
            return ActionOutcome::Skipped;
        };

        let result = self.backend.health().await;

        self.complete(Action::Health, None, result, |state, body| {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .ok_or_else(|| ConsoleError::format("health response has no message"))?;

            state.health = Some(message.to_string());
            Ok("Health check OK".to_string())
        })
    }

    /// Replace the key list with the backend's current listing
    pub async fn fetch_keys(&self) -> ActionOutcome {
        let Some((token, epoch)) = self.current_token() else {
            return ActionOutcome::Skipped;
        };
        let Some(_guard) = self.begin(Action::FetchKeys) else {
            return ActionOutcome::Skipped;
        };

        let result = self.backend.list_api_keys(&token).await;

        self.complete(Action::FetchKeys, Some(epoch), result, |state, body| {
            if !body.is_array() {
                return Err(ConsoleError::format("expected a list of API keys"));
            }

            let keys: Vec<ApiKeyRecord> =
                serde_json::from_value(body).map_err(|e| ConsoleError::format(e.to_string()))?;

            state.api_keys = keys;
            Ok("Loaded API keys".to_string())
        })
    }

    /// Fill the key name input and submit it
    pub async fn create_key(&self, name: impl Into<String>) -> ActionOutcome {
        self.set_api_key_name(name);
        self.submit_create_key().await
    }

    /// Create a key named after the trimmed name input, then refresh the list
    pub async fn submit_create_key(&self) -> ActionOutcome {
        let Some((token, epoch)) = self.current_token() else {
            return ActionOutcome::Skipped;
        };

        let name = self.read().inputs.api_key_name.trim().to_string();
        if name.is_empty() {
            return self.reject_input(KEY_NAME_REQUIRED);
        }

        let Some(_guard) = self.begin(Action::CreateKey) else {
            return ActionOutcome::Skipped;
        };

        let request = CreateApiKeyRequest::new(name);
        let result = self.backend.create_api_key(&token, &request).await;

        let outcome = self.complete(Action::CreateKey, Some(epoch), result, |state, body| {
            let created: CreatedApiKey = serde_json::from_value(body).unwrap_or_default();
            state.inputs.api_key_name.clear();
            Ok(format!("Created API key: {}", created.display_name()))
        });

        // Refresh runs while createKey is still marked busy
        if outcome.is_success() {
            self.fetch_keys().await;
        }

        outcome
    }

    /// `GET /nms/proxy` and keep the pretty-printed reply
    pub async fn test_proxy(&self) -> ActionOutcome {
        let Some((token, epoch)) = self.current_token() else {
            return ActionOutcome::Skipped;
        };
        let Some(_guard) = self.begin(Action::Proxy) else {
            return ActionOutcome::Skipped;
        };

        let result = self.backend.proxy(&token).await;

        self.complete(Action::Proxy, Some(epoch), result, |state, body| {
            let pretty = serde_json::to_string_pretty(&body)
                .map_err(|e| ConsoleError::format(e.to_string()))?;

            state.proxy_response = Some(pretty);
            Ok("Proxy test success".to_string())
        })
    }

    // ---- Local helpers -------------------------------------------------

    /// Flip whether a key is shown in full. Not logged.
    pub fn toggle_visibility(&self, id: &ApiKeyId) -> bool {
        self.write().visibility.toggle(id)
    }

    /// Write `text` to the clipboard and log it under `label`.
    ///
    /// A failed write is logged instead of the confirmation.
    pub fn copy_to_clipboard(&self, text: &str, label: &str) -> Result<(), ConsoleError> {
        let result = self.clipboard.set_text(text);

        let mut state = self.write();
        match &result {
            Ok(()) => state.log.record(format!("Copied {} to clipboard", label)),
            Err(e) => {
                warn!(label, error = %e, "Clipboard write failed");
                state.log.record(format!("Failed to copy {}: {}", label, e));
            }
        }

        result
    }

    pub fn copy_api_key(&self, id: &ApiKeyId) -> Result<(), ConsoleError> {
        let record = self.read().find_key(id).cloned();

        match record {
            Some(record) => {
                self.copy_to_clipboard(&record.key, &format!("API key for \"{}\"", record.name))
            }
            None => Err(self.unknown_key(id)),
        }
    }

    pub fn copy_proxy_response(&self) -> Result<(), ConsoleError> {
        let response = self.read().proxy_response.clone();

        match response {
            Some(response) => self.copy_to_clipboard(&response, "proxy response"),
            None => {
                let error = ConsoleError::validation("No proxy response to copy");
                self.record(error.to_string());
                Err(error)
            }
        }
    }

    /// There is no deletion endpoint; only a notice is logged
    pub fn delete_key(&self, id: &ApiKeyId) {
        let mut state = self.write();
        let label = state
            .find_key(id)
            .map(|k| k.name.clone())
            .unwrap_or_else(|| id.to_string());

        state
            .log
            .record(format!("Delete functionality not implemented for key: {}", label));
    }

    // ---- Internals -----------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, ConsoleState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ConsoleState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Token and epoch read at dispatch time
    fn current_token(&self) -> Option<(String, u64)> {
        let state = self.read();
        let token = state.session.token()?.to_string();
        Some((token, state.session.epoch()))
    }

    fn reject_input(&self, message: &str) -> ActionOutcome {
        let error = ConsoleError::validation(message);
        self.record(error.to_string());
        ActionOutcome::Failed(error)
    }

    fn unknown_key(&self, id: &ApiKeyId) -> ConsoleError {
        let error = ConsoleError::validation(format!("No API key with id {}", id));
        self.record(error.to_string());
        error
    }

    fn begin(&self, action: Action) -> Option<LoadingGuard> {
        let mut state = self.write();

        if self.config.reject_concurrent && state.loading.is_loading(action) {
            debug!(action = %action, "Action already in flight");
            state.log.record(format!("{} already in progress", action));
            return None;
        }

        state.loading.begin(action);
        Some(LoadingGuard {
            state: Arc::clone(&self.state),
            action,
        })
    }

    /// Classify a finished call and apply its effect under one write lock.
    ///
    /// `epoch` is the session generation captured at dispatch; when it no
    /// longer matches, the result is dropped.
    fn complete<F>(
        &self,
        action: Action,
        epoch: Option<u64>,
        result: Result<BackendReply, TransportError>,
        on_success: F,
    ) -> ActionOutcome
    where
        F: FnOnce(&mut ConsoleState, Value) -> Result<String, ConsoleError>,
    {
        let mut state = self.write();

        if let Some(epoch) = epoch {
            if state.session.epoch() != epoch {
                debug!(action = %action, "Session changed while in flight, dropping result");
                return ActionOutcome::Discarded;
            }
        }

        let classified = result
            .map_err(|e| ConsoleError::network(e.to_string()))
            .and_then(|reply| classify(action, reply));

        let error = match classified.and_then(|body| on_success(&mut *state, body)) {
            Ok(message) => {
                info!(action = %action, "{}", message);
                state.log.record(message);
                return ActionOutcome::Succeeded;
            }
            Err(error) => error,
        };

        warn!(action = %action, error = %error, "Action failed");

        match &error {
            ConsoleError::Auth { .. } => {
                state.log.record(error.to_string());
                end_session(&mut state);
            }
            ConsoleError::Domain { .. } => {
                state.log.record(failure_message(action, &error));
            }
            _ => state.log.record(error.to_string()),
        }

        ActionOutcome::Failed(error)
    }
}

fn end_session(state: &mut ConsoleState) {
    state.reset_session();
    state.log.record(LOGGED_OUT);
    info!("Session cleared");
}

/// Sort a reply into success (parsed JSON body) or one of the error classes
fn classify(action: Action, reply: BackendReply) -> Result<Value, ConsoleError> {
    if reply.is_success() {
        return match reply.body {
            ReplyBody::Json(body) => Ok(body),
            ReplyBody::Text(_) | ReplyBody::Empty => {
                Err(ConsoleError::format(format!("{} response is not JSON", action)))
            }
        };
    }

    if action.is_authenticated() && reply.is_unauthorized() {
        return Err(ConsoleError::auth(reply.status));
    }

    Err(ConsoleError::domain(reply.status, reply.detail()))
}

fn failure_message(action: Action, error: &ConsoleError) -> String {
    match action {
        Action::Login => format!(
            "{}: {}",
            action.failure_label(),
            error.detail().unwrap_or("Unknown error")
        ),
        _ => format!("{}: {}", action.failure_label(), error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::OnceLock;

    use mockall::Sequence;
    use serde_json::json;

    use super::*;
    use crate::infrastructure::backend::MockBackendClient;
    use crate::infrastructure::clipboard::MemoryClipboard;

    fn create_service(backend: MockBackendClient) -> ConsoleService {
        ConsoleService::new(Arc::new(backend), Arc::new(MemoryClipboard::new()))
    }

    fn keys_body() -> Value {
        json!([
            {"id": 1, "name": "svc-A", "key": "nms_aaaaaaaaaaaaaaaa", "created_at": "2024-05-01T10:00:00"},
            {"id": 2, "name": "svc-B", "key": "nms_bbbbbbbbbbbbbbbb"}
        ])
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let service = create_service(MockBackendClient::new());

        let outcome = service.login("admin", "").await;

        assert_eq!(
            outcome,
            ActionOutcome::Failed(ConsoleError::validation(CREDENTIALS_REQUIRED))
        );
        let state = service.snapshot();
        assert!(!state.is_authenticated());
        assert_eq!(state.log.messages(), vec![CREDENTIALS_REQUIRED]);
    }

    #[tokio::test]
    async fn test_login_stores_token_and_fetches_keys_once() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .withf(|c: &Credentials| c.username == "admin" && c.password == "adminpass")
            .times(1)
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1", "token_type": "bearer"}))));
        backend
            .expect_list_api_keys()
            .withf(|token: &str| token == "T1")
            .times(1)
            .returning(|_| Ok(BackendReply::json(200, keys_body())));

        let service = create_service(backend);
        let outcome = service.login("admin", "adminpass").await;

        assert_eq!(outcome, ActionOutcome::Succeeded);
        let state = service.snapshot();
        assert_eq!(state.session.token(), Some("T1"));
        assert_eq!(state.api_keys.len(), 2);
        assert!(!state.loading.any_loading());
        assert_eq!(state.log.messages(), vec!["Loaded API keys", LOGGED_IN]);
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_detail() {
        let mut backend = MockBackendClient::new();
        backend.expect_request_token().returning(|_| {
            Ok(BackendReply::json(
                401,
                json!({"detail": "Incorrect username or password"}),
            ))
        });

        let service = create_service(backend);
        let outcome = service.login("admin", "wrong").await;

        assert!(matches!(outcome, ActionOutcome::Failed(ConsoleError::Domain { status: 401, .. })));
        let state = service.snapshot();
        assert!(!state.is_authenticated());
        assert_eq!(
            state.log.latest().unwrap().message,
            "Login failed: Incorrect username or password"
        );
    }

    #[tokio::test]
    async fn test_login_failure_without_detail() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::empty(500)));

        let service = create_service(backend);
        service.login("admin", "pw").await;

        assert_eq!(
            service.snapshot().log.latest().unwrap().message,
            "Login failed: Unknown error"
        );
    }

    #[tokio::test]
    async fn test_login_without_access_token_is_format_error() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::json(200, json!({"token_type": "bearer"}))));

        let service = create_service(backend);
        let outcome = service.login("admin", "pw").await;

        assert!(matches!(outcome, ActionOutcome::Failed(ConsoleError::Format { .. })));
        assert!(!service.is_authenticated());
        assert!(!service.is_loading(Action::Login));
    }

    #[tokio::test]
    async fn test_network_error_is_logged_and_flag_cleared() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Err(TransportError::Connect("connection refused".to_string())));

        let service = create_service(backend);
        let outcome = service.login("admin", "pw").await;

        assert!(matches!(outcome, ActionOutcome::Failed(ConsoleError::Network { .. })));
        let state = service.snapshot();
        assert!(!state.loading.is_loading(Action::Login));
        assert_eq!(
            state.log.latest().unwrap().message,
            "Network error: connection failed: connection refused"
        );
    }

    #[tokio::test]
    async fn test_fetch_keys_without_token_is_skipped() {
        let service = create_service(MockBackendClient::new());

        assert_eq!(service.fetch_keys().await, ActionOutcome::Skipped);
        assert_eq!(service.test_proxy().await, ActionOutcome::Skipped);
        assert_eq!(service.create_key("svc").await, ActionOutcome::Skipped);
        assert!(service.snapshot().log.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_keys_401_logs_out() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1"}))));
        backend
            .expect_list_api_keys()
            .times(1)
            .returning(|_| Ok(BackendReply::json(200, keys_body())));
        backend
            .expect_list_api_keys()
            .times(1)
            .returning(|_| Ok(BackendReply::json(401, json!({"detail": "Invalid token"}))));

        let service = create_service(backend);
        service.login("admin", "pw").await;
        service.toggle_visibility(&ApiKeyId::Numeric(1));

        let outcome = service.fetch_keys().await;

        assert_eq!(outcome, ActionOutcome::Failed(ConsoleError::auth(401)));
        let state = service.snapshot();
        assert!(!state.is_authenticated());
        assert!(state.api_keys.is_empty());
        assert!(state.visibility.is_empty());
        assert!(!state.loading.is_loading(Action::FetchKeys));

        let messages = state.log.messages();
        assert_eq!(messages[0], LOGGED_OUT);
        assert_eq!(messages[1], "Authentication failed. Please log in again.");
    }

    #[tokio::test]
    async fn test_fetch_keys_non_array_keeps_list() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1"}))));
        backend
            .expect_list_api_keys()
            .times(1)
            .returning(|_| Ok(BackendReply::json(200, keys_body())));
        backend
            .expect_list_api_keys()
            .times(1)
            .returning(|_| Ok(BackendReply::json(200, json!({}))));

        let service = create_service(backend);
        service.login("admin", "pw").await;
        let before = service.snapshot().api_keys;

        let outcome = service.fetch_keys().await;

        assert!(matches!(outcome, ActionOutcome::Failed(ConsoleError::Format { .. })));
        let state = service.snapshot();
        assert_eq!(state.api_keys, before);
        assert!(state
            .log
            .latest()
            .unwrap()
            .message
            .starts_with("Unexpected response format"));
    }

    #[tokio::test]
    async fn test_fetch_keys_other_status_keeps_session() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1"}))));
        backend
            .expect_list_api_keys()
            .returning(|_| Ok(BackendReply::empty(503)));

        let service = create_service(backend);
        service.login("admin", "pw").await;

        let state = service.snapshot();
        assert!(state.is_authenticated());
        assert_eq!(state.log.latest().unwrap().message, "Failed to fetch keys: 503");
    }

    #[tokio::test]
    async fn test_create_key_refreshes_after_create_while_busy() {
        let service_slot: Arc<OnceLock<ConsoleService>> = Arc::new(OnceLock::new());
        let busy_during_refresh = Arc::new(AtomicBool::new(false));

        let mut seq = Sequence::new();
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1"}))));
        backend
            .expect_list_api_keys()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(BackendReply::json(200, json!([]))));
        backend
            .expect_create_api_key()
            .withf(|token: &str, request: &CreateApiKeyRequest| {
                token == "T1" && request.name == "svc-A"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(BackendReply::json(200, json!({"id": 1, "name": "svc-A", "key": "k"}))));

        let refresh_slot = Arc::clone(&service_slot);
        let refresh_busy = Arc::clone(&busy_during_refresh);
        backend
            .expect_list_api_keys()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| {
                if let Some(service) = refresh_slot.get() {
                    refresh_busy.store(service.is_loading(Action::CreateKey), Ordering::SeqCst);
                }
                Ok(BackendReply::json(200, keys_body()))
            });

        let service = create_service(backend);
        service_slot.set(service.clone()).unwrap();

        service.login("admin", "pw").await;
        let outcome = service.create_key("  svc-A  ").await;

        assert_eq!(outcome, ActionOutcome::Succeeded);
        assert!(busy_during_refresh.load(Ordering::SeqCst));

        let state = service.snapshot();
        assert!(!state.loading.is_loading(Action::CreateKey));
        assert!(state.inputs.api_key_name.is_empty());
        assert_eq!(state.api_keys.len(), 2);
        assert_eq!(
            state.log.messages()[..2],
            ["Loaded API keys".to_string(), "Created API key: svc-A".to_string()]
        );
    }

    #[tokio::test]
    async fn test_create_key_requires_name() {
        let service = create_service(logged_in_backend());
        service.login("admin", "pw").await;

        let outcome = service.create_key("   ").await;

        assert_eq!(
            outcome,
            ActionOutcome::Failed(ConsoleError::validation(KEY_NAME_REQUIRED))
        );
    }

    #[tokio::test]
    async fn test_create_key_failure_logs_detail() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1"}))));
        backend
            .expect_list_api_keys()
            .times(1)
            .returning(|_| Ok(BackendReply::json(200, json!([]))));
        backend.expect_create_api_key().returning(|_, _| {
            Ok(BackendReply::json(400, json!({"detail": "Name already exists"})))
        });

        let service = create_service(backend);
        service.login("admin", "pw").await;
        service.create_key("svc-A").await;

        let state = service.snapshot();
        assert_eq!(
            state.log.latest().unwrap().message,
            "Failed to create key: 400 - Name already exists"
        );
        assert_eq!(state.inputs.api_key_name, "svc-A");
    }

    #[tokio::test]
    async fn test_health_check_stores_message() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_health()
            .returning(|| Ok(BackendReply::json(200, json!({"message": "ok"}))));

        let service = create_service(backend);
        let outcome = service.check_health().await;

        assert_eq!(outcome, ActionOutcome::Succeeded);
        let state = service.snapshot();
        assert_eq!(state.health.as_deref(), Some("ok"));
        assert!(!state.loading.is_loading(Action::Health));
        assert_eq!(state.log.messages(), vec!["Health check OK"]);
    }

    #[tokio::test]
    async fn test_health_check_kept_when_session_changes_in_flight() {
        let service_slot: Arc<OnceLock<ConsoleService>> = Arc::new(OnceLock::new());
        let mut backend = logged_in_backend();

        let logout_slot = Arc::clone(&service_slot);
        backend.expect_health().times(1).returning(move || {
            if let Some(service) = logout_slot.get() {
                service.logout();
            }
            Ok(BackendReply::json(200, json!({"message": "ok"})))
        });

        let service = create_service(backend);
        service_slot.set(service.clone()).unwrap();
        service.login("admin", "pw").await;

        let outcome = service.check_health().await;

        assert_eq!(outcome, ActionOutcome::Succeeded);
        let state = service.snapshot();
        assert!(!state.is_authenticated());
        assert_eq!(state.health.as_deref(), Some("ok"));
        assert_eq!(state.log.latest().unwrap().message, "Health check OK");
    }

    #[tokio::test]
    async fn test_health_check_failure_status() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_health()
            .returning(|| Ok(BackendReply::new(502, ReplyBody::Text("Bad Gateway".to_string()))));

        let service = create_service(backend);
        service.check_health().await;

        let state = service.snapshot();
        assert!(state.health.is_none());
        assert_eq!(state.log.latest().unwrap().message, "Health check failed: 502");
    }

    #[tokio::test]
    async fn test_proxy_pretty_prints_response() {
        let mut backend = logged_in_backend();
        backend.expect_proxy().returning(|_| {
            Ok(BackendReply::json(200, json!({"status": "success", "data": {"alerts_active": 2}})))
        });

        let service = create_service(backend);
        service.login("admin", "pw").await;
        service.test_proxy().await;

        let state = service.snapshot();
        let expected = "{\n  \"status\": \"success\",\n  \"data\": {\n    \"alerts_active\": 2\n  }\n}";
        assert_eq!(state.proxy_response.as_deref(), Some(expected));
        assert_eq!(state.log.latest().unwrap().message, "Proxy test success");
    }

    #[tokio::test]
    async fn test_proxy_401_logs_out() {
        let mut backend = logged_in_backend();
        backend
            .expect_proxy()
            .returning(|_| Ok(BackendReply::empty(401)));

        let service = create_service(backend);
        service.login("admin", "pw").await;
        service.test_proxy().await;

        let state = service.snapshot();
        assert!(!state.is_authenticated());
        assert!(state.proxy_response.is_none());
    }

    #[tokio::test]
    async fn test_logout_twice_is_idempotent() {
        let service = create_service(logged_in_backend());
        service.login("admin", "pw").await;
        let before = service.snapshot().log.len();

        service.logout();
        let once = service.snapshot();
        service.logout();
        let twice = service.snapshot();

        assert_eq!(twice.log.len(), before + 2);
        assert_eq!(once.api_keys, twice.api_keys);
        assert_eq!(once.inputs, twice.inputs);
        assert!(!twice.is_authenticated());
        assert_eq!(twice.log.messages()[..2], [LOGGED_OUT.to_string(), LOGGED_OUT.to_string()]);
    }

    #[tokio::test]
    async fn test_response_after_logout_is_discarded() {
        let service_slot: Arc<OnceLock<ConsoleService>> = Arc::new(OnceLock::new());
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1"}))));

        let logout_slot = Arc::clone(&service_slot);
        backend.expect_list_api_keys().times(1).returning(move |_| {
            if let Some(service) = logout_slot.get() {
                service.logout();
            }
            Ok(BackendReply::json(200, keys_body()))
        });

        let service = create_service(backend);
        service_slot.set(service.clone()).unwrap();

        service.login("admin", "pw").await;

        let state = service.snapshot();
        assert!(!state.is_authenticated());
        assert!(state.api_keys.is_empty());
        assert!(!state.loading.is_loading(Action::FetchKeys));
        assert_eq!(state.log.latest().unwrap().message, LOGGED_OUT);
    }

    #[tokio::test]
    async fn test_toggle_visibility_is_not_logged() {
        let service = create_service(MockBackendClient::new());
        let id = ApiKeyId::Numeric(5);

        assert!(service.toggle_visibility(&id));
        assert!(!service.toggle_visibility(&id));
        assert!(service.snapshot().log.is_empty());
    }

    #[tokio::test]
    async fn test_copy_api_key_logs_label() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let service = ConsoleService::new(Arc::new(logged_in_backend()), clipboard.clone());
        service.login("admin", "pw").await;

        service.copy_api_key(&ApiKeyId::Numeric(1)).unwrap();

        assert_eq!(clipboard.contents().as_deref(), Some("nms_aaaaaaaaaaaaaaaa"));
        assert_eq!(
            service.snapshot().log.latest().unwrap().message,
            "Copied API key for \"svc-A\" to clipboard"
        );
    }

    #[tokio::test]
    async fn test_copy_failure_is_logged() {
        let service = ConsoleService::new(
            Arc::new(MockBackendClient::new()),
            Arc::new(MemoryClipboard::failing("no display")),
        );

        let result = service.copy_to_clipboard("text", "proxy response");

        assert!(result.is_err());
        assert_eq!(
            service.snapshot().log.latest().unwrap().message,
            "Failed to copy proxy response: Clipboard error: no display"
        );
    }

    #[tokio::test]
    async fn test_delete_key_only_logs() {
        let service = create_service(logged_in_backend());
        service.login("admin", "pw").await;

        service.delete_key(&ApiKeyId::Numeric(2));

        let state = service.snapshot();
        assert_eq!(state.api_keys.len(), 2);
        assert_eq!(
            state.log.latest().unwrap().message,
            "Delete functionality not implemented for key: svc-B"
        );
    }

    #[tokio::test]
    async fn test_log_capacity_is_applied() {
        let service = ConsoleService::with_config(
            Arc::new(MockBackendClient::new()),
            Arc::new(MemoryClipboard::new()),
            ConsoleServiceConfig {
                log_capacity: Some(2),
                ..Default::default()
            },
        );

        service.logout();
        service.logout();
        service.logout();

        assert_eq!(service.snapshot().log.len(), 2);
    }

    fn logged_in_backend() -> MockBackendClient {
        let mut backend = MockBackendClient::new();
        backend
            .expect_request_token()
            .returning(|_| Ok(BackendReply::json(200, json!({"access_token": "T1"}))));
        backend
            .expect_list_api_keys()
            .times(1)
            .returning(|_| Ok(BackendReply::json(200, keys_body())));
        backend
    }
}
