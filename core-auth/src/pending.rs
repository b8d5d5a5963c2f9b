//! Pending authorization storage
//!
//! Keeps the PKCE verifier of the one sign-in in flight between the redirect
//! to Dropbox and the redirect back. The backing [`SessionStore`] is scoped to
//! the browser tab (or the process, on desktop), so nothing outlives the
//! session.
//!
//! ## Example
//!
//! ```no_run
//! use bridge_traits::MemorySessionStore;
//! use core_auth::{PendingAuthStore, PkceVerifier};
//! use std::sync::Arc;
//!
//! # async fn example() -> core_auth::Result<()> {
//! let pending = PendingAuthStore::new(Arc::new(MemorySessionStore::new()));
//!
//! pending.save(&PkceVerifier::generate()?).await?;
//! let verifier = pending.load().await?;
//! assert!(verifier.is_some());
//!
//! pending.clear().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::oauth::PkceVerifier;
use bridge_traits::storage::SessionStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Session storage key of the in-flight code verifier.
pub const CODE_VERIFIER_KEY: &str = "dropbox_code_verifier";

/// Session-scoped store for the pending code verifier.
#[derive(Clone)]
pub struct PendingAuthStore {
    store: Arc<dyn SessionStore>,
}

impl PendingAuthStore {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Store `verifier`, replacing any verifier already pending.
    pub async fn save(&self, verifier: &PkceVerifier) -> Result<()> {
        self.store
            .set(CODE_VERIFIER_KEY, verifier.as_str())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to persist code verifier");
                AuthError::Storage(e.to_string())
            })?;
        debug!("Code verifier stored");
        Ok(())
    }

    /// The pending verifier, if a sign-in is in flight.
    pub async fn load(&self) -> Result<Option<PkceVerifier>> {
        let value = self
            .store
            .get(CODE_VERIFIER_KEY)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(value
            .filter(|v| !v.is_empty())
            .map(PkceVerifier::from_string))
    }

    pub async fn clear(&self) -> Result<()> {
        self.store
            .remove(CODE_VERIFIER_KEY)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::storage::MemorySessionStore;

    struct UnavailableStore;

    #[async_trait]
    impl SessionStore for UnavailableStore {
        async fn get(&self, _key: &str) -> BridgeResult<Option<String>> {
            Err(BridgeError::NotAvailable("sessionStorage".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Err(BridgeError::NotAvailable("sessionStorage".to_string()))
        }

        async fn remove(&self, _key: &str) -> BridgeResult<()> {
            Err(BridgeError::NotAvailable("sessionStorage".to_string()))
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let backing = Arc::new(MemorySessionStore::new());
        let pending = PendingAuthStore::new(backing.clone());

        assert!(pending.load().await.unwrap().is_none());

        let verifier = PkceVerifier::from_string("abc");
        pending.save(&verifier).await.unwrap();
        assert_eq!(
            backing.get(CODE_VERIFIER_KEY).await.unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(pending.load().await.unwrap(), Some(verifier));

        pending.clear().await.unwrap();
        assert!(pending.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_verifier() {
        let pending = PendingAuthStore::new(Arc::new(MemorySessionStore::new()));

        pending.save(&PkceVerifier::from_string("first")).await.unwrap();
        pending.save(&PkceVerifier::from_string("second")).await.unwrap();

        assert_eq!(
            pending.load().await.unwrap().map(|v| v.as_str().to_string()),
            Some("second".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_value_is_not_a_verifier() {
        let backing = Arc::new(MemorySessionStore::new());
        backing.set(CODE_VERIFIER_KEY, "").await.unwrap();

        let pending = PendingAuthStore::new(backing);
        assert!(pending.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_failures_map_to_auth_error() {
        let pending = PendingAuthStore::new(Arc::new(UnavailableStore));

        assert!(matches!(
            pending.save(&PkceVerifier::from_string("v")).await,
            Err(AuthError::Storage(_))
        ));
        assert!(matches!(pending.load().await, Err(AuthError::Storage(_))));
        assert!(matches!(pending.clear().await, Err(AuthError::Storage(_))));
    }
}
