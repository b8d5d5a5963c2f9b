//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells can use [`build_wasm_bridges`] to construct every browser
//! adapter at once. The result mirrors the role that the `bridge-desktop`
//! crate plays for native targets.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult, http::HttpClient, storage::SessionStore, Clipboard, Navigator,
};
use tracing::warn;

use crate::{
    clipboard::WasmClipboard, http::WasmHttpClient, navigation::WindowNavigator,
    storage::WasmSessionStore,
};

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// `sessionStorage`-backed store for the pending verifier.
    pub session_store: Arc<dyn SessionStore>,
    /// Current tab navigation.
    pub navigator: Arc<dyn Navigator>,
    /// Clipboard, when the page may use it.
    pub clipboard: Option<Arc<dyn Clipboard>>,
    /// `window.location.origin`.
    pub origin: String,
}

/// Build the default wasm bridge stack.
///
/// Fails when `window`, `fetch` or `sessionStorage` are unavailable. A
/// missing clipboard only disables copying.
pub fn build_wasm_bridges() -> BridgeResult<WasmBridgeSet> {
    let navigator = WindowNavigator::new()?;
    let origin = navigator.origin()?;

    let clipboard: Option<Arc<dyn Clipboard>> = match WasmClipboard::new() {
        Ok(clipboard) => Some(Arc::new(clipboard)),
        Err(e) => {
            warn!(error = %e, "Clipboard unavailable");
            None
        }
    };

    Ok(WasmBridgeSet {
        http_client: Arc::new(WasmHttpClient::new()?),
        session_store: Arc::new(WasmSessionStore::new()?),
        navigator: Arc::new(navigator),
        clipboard,
        origin,
    })
}
