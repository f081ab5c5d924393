//! Clipboard access for copying keys and proxy responses

use std::sync::Mutex;

use crate::domain::ConsoleError;

pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ConsoleError>;
}

/// System clipboard via arboard, opened on first use
#[derive(Default)]
pub struct SystemClipboard {
    inner: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ConsoleError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ConsoleError::clipboard("Failed to acquire lock"))?;

        if guard.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ConsoleError::clipboard(e.to_string()))?;
            *guard = Some(clipboard);
        }

        match guard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ConsoleError::clipboard(e.to_string())),
            None => Err(ConsoleError::clipboard("clipboard unavailable")),
        }
    }
}

/// Process-local clipboard for headless sessions and tests
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    failure: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(None),
            failure: Some(message.into()),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) -> Result<(), ConsoleError> {
        if let Some(message) = &self.failure {
            return Err(ConsoleError::clipboard(message.clone()));
        }

        let mut contents = self
            .contents
            .lock()
            .map_err(|_| ConsoleError::clipboard("Failed to acquire lock"))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}
