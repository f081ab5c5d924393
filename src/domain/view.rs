//! View-derived state: loading flags per action and key visibility

use std::collections::HashMap;

use super::api_key::ApiKeyId;

/// Logical name of an orchestrated backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    Health,
    FetchKeys,
    CreateKey,
    Proxy,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Login,
        Action::Health,
        Action::FetchKeys,
        Action::CreateKey,
        Action::Proxy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Health => "health",
            Self::FetchKeys => "fetchKeys",
            Self::CreateKey => "createKey",
            Self::Proxy => "proxy",
        }
    }

    /// Whether the call carries the bearer token
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::FetchKeys | Self::CreateKey | Self::Proxy)
    }

    /// Prefix of the log line written when the call fails
    pub fn failure_label(&self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Health => "Health check failed",
            Self::FetchKeys => "Failed to fetch keys",
            Self::CreateKey => "Failed to create key",
            Self::Proxy => "Proxy test failed",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions currently in flight, counted per action so overlapping calls of
/// the same name keep the flag set until the last one finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    active: HashMap<Action, usize>,
}

impl LoadingFlags {
    /// Mark a call as started; returns false if the action was already running
    pub fn begin(&mut self, action: Action) -> bool {
        let count = self.active.entry(action).or_insert(0);
        *count += 1;
        *count == 1
    }

    pub fn finish(&mut self, action: Action) {
        if let Some(count) = self.active.get_mut(&action) {
            *count -= 1;
            if *count == 0 {
                self.active.remove(&action);
            }
        }
    }

    pub fn is_loading(&self, action: Action) -> bool {
        self.active.contains_key(&action)
    }

    pub fn any_loading(&self) -> bool {
        !self.active.is_empty()
    }
}

/// Per-key reveal toggles. Absent means hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityMap {
    visible: HashMap<ApiKeyId, bool>,
}

impl VisibilityMap {
    /// Flip the toggle and return the new value
    pub fn toggle(&mut self, id: &ApiKeyId) -> bool {
        let entry = self.visible.entry(id.clone()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_visible(&self, id: &ApiKeyId) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.visible.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}
