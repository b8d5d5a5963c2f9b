//! OS clipboard via `arboard`

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::Clipboard;
use std::sync::Mutex;
use tracing::debug;

/// System clipboard.
///
/// The `arboard` handle is kept for the bridge's lifetime; on X11 and Wayland
/// the copied text is served only while the handle is alive.
pub struct ArboardClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = arboard::Clipboard::new()
            .map_err(|e| BridgeError::NotAvailable(format!("Clipboard init failed: {}", e)))?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

#[async_trait]
impl Clipboard for ArboardClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| BridgeError::OperationFailed("clipboard poisoned".to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| BridgeError::OperationFailed(format!("Clipboard write failed: {}", e)))?;
        debug!(chars = text.len(), "Copied text to clipboard");
        Ok(())
    }
}
