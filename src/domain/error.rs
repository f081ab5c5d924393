use thiserror::Error;

/// Console errors, one variant per outcome class an action can end in.
///
/// The display strings double as the user-visible log wording, so they stay
/// short and free of debug formatting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Required local input missing; never reaches the network
    #[error("{message}")]
    Validation { message: String },

    /// HTTP 401 on an authenticated call
    #[error("Authentication failed. Please log in again.")]
    Auth { status: u16 },

    /// Any other non-2xx reply, with the server's `detail` when it sent one
    #[error("{}", describe_status(.status, .detail))]
    Domain { status: u16, detail: Option<String> },

    /// Transport failure, no response received
    #[error("Network error: {message}")]
    Network { message: String },

    /// 2xx reply with an unexpected shape
    #[error("Unexpected response format: {message}")]
    Format { message: String },

    #[error("Clipboard error: {message}")]
    Clipboard { message: String },
}

fn describe_status(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!("{} - {}", status, detail),
        None => status.to_string(),
    }
}

impl ConsoleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn auth(status: u16) -> Self {
        Self::Auth { status }
    }

    pub fn domain(status: u16, detail: Option<String>) -> Self {
        Self::Domain { status, detail }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard {
            message: message.into(),
        }
    }

    /// Whether this error tears down the whole session
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    /// Server-provided detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Domain { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
