//! Session token and login form inputs

/// Current bearer session.
///
/// The epoch increases on every transition (login or logout) so an in-flight
/// call can tell whether the session it was dispatched under is still current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    epoch: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with a freshly issued token
    pub fn establish(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
        self.epoch += 1;
    }

    /// Drop the token. Safe to call when already logged out.
    pub fn clear(&mut self) {
        self.token = None;
        self.epoch += 1;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Username and password submitted to `/admin/token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-empty
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Text currently held by the console's input fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub username: String,
    pub password: String,
    pub api_key_name: String,
}

impl FormInputs {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}
