//! API key checking
//!
//! Key issuance lives outside the bridge; the HTTP layer only asks an
//! `ApiKeyValidator` whether a presented key is acceptable.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::config::AuthConfig;

/// Outcome of checking one presented key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheck {
    Valid,
    Invalid,
    /// No keys exist at all; every request must be refused
    NotConfigured,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyValidator: Send + Sync {
    async fn check(&self, key: &str) -> KeyCheck;
}

/// Keys taken from `[auth]` and the `EA_API_KEY` / `EA_API_KEYS` variables
#[derive(Debug, Clone, Default)]
pub struct StaticApiKeys {
    keys: BTreeSet<String>,
}

impl StaticApiKeys {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        let validator = Self {
            keys: auth.valid_keys(),
        };
        if validator.keys.is_empty() {
            tracing::warn!("No API keys configured; all authenticated endpoints will return 500");
        } else {
            tracing::info!(count = validator.keys.len(), "API keys loaded");
        }
        validator
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl ApiKeyValidator for StaticApiKeys {
    async fn check(&self, key: &str) -> KeyCheck {
        if self.keys.is_empty() {
            KeyCheck::NotConfigured
        } else if self.keys.contains(key) {
            KeyCheck::Valid
        } else {
            KeyCheck::Invalid
        }
    }
}
