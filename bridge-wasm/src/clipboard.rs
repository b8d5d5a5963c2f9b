//! `Clipboard` on top of the asynchronous Clipboard API.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    Clipboard,
};
use wasm_bindgen_futures::JsFuture;

use crate::error::{js_message, WasmError};

/// `navigator.clipboard`. Browsers only allow writes from a secure context
/// while the page has focus.
pub struct WasmClipboard {
    clipboard: web_sys::Clipboard,
}

impl WasmClipboard {
    /// Bind to the current window's clipboard.
    pub fn new() -> BridgeResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".into()))?;
        Ok(Self {
            clipboard: window.navigator().clipboard(),
        })
    }
}

#[async_trait(?Send)]
impl Clipboard for WasmClipboard {
    async fn write_text(&self, text: &str) -> BridgeResult<()> {
        JsFuture::from(self.clipboard.write_text(text))
            .await
            .map(|_| ())
            .map_err(|err| BridgeError::OperationFailed(js_message(&err)))
    }
}
