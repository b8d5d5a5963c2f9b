//! Clipboard Abstraction

use async_trait::async_trait;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Writes plain text to the system clipboard.
///
/// Hosts without clipboard access simply don't provide an implementation; the
/// core reports the copy as unavailable instead of failing.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Clipboard: PlatformSendSync {
    async fn write_text(&self, text: &str) -> Result<()>;
}
