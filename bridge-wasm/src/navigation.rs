//! `Navigator` on top of `window.location` and `window.history`.

use bridge_traits::{error::Result as BridgeResult, Navigator};
use tracing::debug;
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::error::{js_error, WasmError};

/// Navigates the current browser tab.
pub struct WindowNavigator {
    window: Window,
}

impl WindowNavigator {
    /// Bind to the current window.
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".into()))?;
        Ok(Self { window })
    }

    /// `window.location.origin`, the natural redirect URI for a single-page app.
    pub fn origin(&self) -> BridgeResult<String> {
        self.window
            .location()
            .origin()
            .map_err(|err| js_error("location.origin", err))
    }
}

impl Navigator for WindowNavigator {
    fn redirect(&self, url: &str) -> BridgeResult<()> {
        debug!("Navigating away from the app");
        self.window
            .location()
            .set_href(url)
            .map_err(|err| js_error("location.href", err))
    }

    fn current_url(&self) -> BridgeResult<Option<String>> {
        self.window
            .location()
            .href()
            .map(Some)
            .map_err(|err| js_error("location.href", err))
    }

    fn current_query(&self) -> BridgeResult<String> {
        let search = self
            .window
            .location()
            .search()
            .map_err(|err| js_error("location.search", err))?;
        Ok(search.trim_start_matches('?').to_string())
    }

    fn replace_url(&self, url: &str) -> BridgeResult<()> {
        let history = self
            .window
            .history()
            .map_err(|err| js_error("window.history", err))?;
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(|err| js_error("history.replaceState", err))
    }
}
