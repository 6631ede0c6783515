//! Credential storage consulted by `HttpClient` on every request.

use std::sync::RwLock;

/// Holder of the current access token.
///
/// `HttpClient` reads `token()` to attach `Authorization: Bearer`, and calls
/// `invalidate()` whenever the server answers 401.
pub trait Session: Send + Sync {
    fn token(&self) -> Option<String>;

    fn store(&self, token: &str);

    fn invalidate(&self);
}

/// Process-local session. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl Session for MemorySession {
    fn token(&self) -> Option<String> {
        self.token.read().map(|t| t.clone()).unwrap_or(None)
    }

    fn store(&self, token: &str) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
    }

    fn invalidate(&self) {
        if let Ok(mut slot) = self.token.write() {
            if slot.take().is_some() {
                tracing::info!("session invalidated");
            }
        }
    }
}
