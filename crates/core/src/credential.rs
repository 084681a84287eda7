//! Bearer credential shared with the authentication collaborator.
//!
//! The collaborator (login flow, operator console) writes or clears the
//! token; backend clients only read it when building a request. The store is
//! handed to clients at construction instead of being looked up globally.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Opaque bearer token. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Shared, replaceable bearer credential.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    token: Arc<RwLock<Option<BearerToken>>>,
}

impl CredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from configuration. Empty strings are ignored.
    pub fn from_config(token: Option<&str>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.and_then(BearerToken::new))),
        }
    }

    pub async fn set(&self, token: BearerToken) {
        *self.token.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    pub async fn current(&self) -> Option<BearerToken> {
        self.token.read().await.clone()
    }

    pub async fn is_set(&self) -> bool {
        self.token.read().await.is_some()
    }
}
