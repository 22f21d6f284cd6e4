// Auth context - Bearer token lookup for outgoing requests
use crate::infrastructure::local_store::{LocalStore, StoreError};
use std::sync::Arc;

pub const TOKEN_KEY: &str = "nebula_token";

/// Holds the bearer token the API client attaches to every request.
///
/// A token saved in the local store always wins over the configured
/// default. Writes come from the settings page only; last write wins.
#[derive(Debug, Clone)]
pub struct TokenStore {
    store: Arc<LocalStore>,
    default_token: Option<String>,
}

impl TokenStore {
    pub fn new(store: Arc<LocalStore>, default_token: Option<String>) -> Self {
        Self {
            store,
            default_token,
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.store
            .get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .or_else(|| self.default_token.clone())
    }

    /// Persist a token; returns false and stores nothing for a blank one
    pub fn set_token(&self, token: &str) -> Result<bool, StoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }
        self.store.set(TOKEN_KEY, token)?;
        tracing::info!("Bearer token saved to {}", self.store.path().display());
        Ok(true)
    }

    pub fn clear_token(&self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY)?;
        tracing::info!("Saved bearer token removed");
        Ok(())
    }

    /// Wipe the rest of the persisted client state, keeping the token
    pub fn clear_cache(&self) -> Result<usize, StoreError> {
        let removed = self.store.clear_except(TOKEN_KEY)?;
        tracing::info!("Cleared {} cached entries", removed);
        Ok(removed)
    }
}
