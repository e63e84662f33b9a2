//! # Static Secret Store
//!
//! `SecretStore` adapter over fixed in-process material, for tests and
//! single-tenant deployments where the secret arrives via environment or
//! injected configuration rather than a remote store.

use crate::domain::entities::SigningSecret;
use crate::ports::outbound::{SecretStore, SecretStoreError};

/// Secret store holding one identifier's worth of material in memory.
///
/// The material is either a bare secret string or a JSON array of strings;
/// an array is the rotation form, listed current-first. This matches what
/// managed secret stores hand back for a `SecretString`-style value.
pub struct StaticSecretStore {
    id: String,
    material: String,
}

impl StaticSecretStore {
    /// Create a store answering for `id` with the given raw material.
    #[must_use]
    pub fn new(id: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            material: material.into(),
        }
    }

    fn parse_material(&self) -> Vec<SigningSecret> {
        let trimmed = self.material.trim();

        if trimmed.starts_with('[') {
            if let Ok(values) = serde_json::from_str::<Vec<String>>(trimmed) {
                return values
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| SigningSecret::new(format!("{}#{i}", self.id), value))
                    .collect();
            }
        }

        vec![SigningSecret::new(self.id.clone(), trimmed)]
    }
}

impl std::fmt::Debug for StaticSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecretStore")
            .field("id", &self.id)
            .field("material", &"[REDACTED]")
            .finish()
    }
}

#[async_trait::async_trait]
impl SecretStore for StaticSecretStore {
    async fn fetch_secret(&self, id: &str) -> Result<Vec<SigningSecret>, SecretStoreError> {
        if id != self.id {
            return Err(SecretStoreError::NotFound(id.to_string()));
        }

        let secrets = self.parse_material();
        if secrets.is_empty() || secrets.iter().any(|s| s.as_bytes().is_empty()) {
            return Err(SecretStoreError::NotFound(id.to_string()));
        }

        Ok(secrets)
    }
}
