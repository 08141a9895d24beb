//! Credential types and the supplier seam.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::NodeError;

/// Name under which the Abacus.AI API key is registered.
pub const ABACUS_AI_API: &str = "abacusAiApi";

/// The Abacus.AI API credential. Only `apiKey` is read.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbacusAiApi {
    pub api_key: String,
}

impl AbacusAiApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for AbacusAiApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbacusAiApi")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Resolves a credential by name. Read-only: nothing is written or rotated.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<AbacusAiApi, NodeError>;
}

/// Fixed in-memory credentials.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    entries: HashMap<String, AbacusAiApi>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a credential.
    pub fn with(mut self, name: impl Into<String>, credential: AbacusAiApi) -> Self {
        self.entries.insert(name.into(), credential);
        self
    }

    /// Shorthand for a store holding a single Abacus.AI key.
    pub fn abacus(api_key: impl Into<String>) -> Self {
        Self::new().with(ABACUS_AI_API, AbacusAiApi::new(api_key))
    }
}

#[async_trait]
impl CredentialStore for StaticCredentials {
    async fn get(&self, name: &str) -> Result<AbacusAiApi, NodeError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| NodeError::Credential(format!("no credentials found for '{name}'")))
    }
}
