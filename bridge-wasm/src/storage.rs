//! `SessionStore` on top of `window.sessionStorage`.
//!
//! Values live as long as the browser tab and survive the redirect to the
//! authorization page and back, which is what the pending PKCE verifier needs.

use async_trait::async_trait;
use bridge_traits::{error::Result as BridgeResult, storage::SessionStore};

use crate::error::{js_error, WasmError};

/// Tab-scoped storage.
#[derive(Clone)]
pub struct WasmSessionStore {
    storage: web_sys::Storage,
}

impl WasmSessionStore {
    /// Bind to the current window's `sessionStorage`.
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".into()))?;
        let storage = window
            .session_storage()
            .map_err(|err| js_error("sessionStorage", err))?
            .ok_or_else(|| WasmError::NotAvailable("sessionStorage".into()))?;
        Ok(Self { storage })
    }
}

#[async_trait(?Send)]
impl SessionStore for WasmSessionStore {
    async fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|err| js_error("sessionStorage.getItem", err))
    }

    async fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| js_error("sessionStorage.setItem", err))
    }

    async fn remove(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|err| js_error("sessionStorage.removeItem", err))
    }
}
