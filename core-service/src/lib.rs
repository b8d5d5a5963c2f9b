//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, session
//! storage, navigation, clipboard) into the [`FileBrowser`]. Desktop apps
//! typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`), whereas WebAssembly builds enable the `wasm` feature and
//! rely on the adapters from `bridge-wasm`.
//!
//! ```no_run
//! # #[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
//! # async fn example() -> core_service::Result<()> {
//! use core_runtime::config::AppConfig;
//! use core_service::{bootstrap_desktop, Command};
//!
//! let (browser, _navigator) = bootstrap_desktop(AppConfig::from_env()?)?;
//! browser.execute(Command::SignIn).await;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod command;
pub mod error;
pub mod state;

pub use browser::FileBrowser;
pub use command::{Command, Confirmation, OutputMode};
pub use error::{CoreError, Result};
pub use state::{AppState, ListingSource, OpenFile};

use std::sync::Arc;

use bridge_traits::{http::HttpClient, storage::SessionStore, Clipboard, Navigator};
use core_runtime::events::{EventBus, DEFAULT_EVENT_BUFFER_SIZE};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
use bridge_desktop::{MemorySessionStore, ReqwestHttpClient, SystemNavigator};
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use bridge_wasm::{build_wasm_bridges, WasmBridgeSet};

/// Aggregated handle to all bridge dependencies the browser requires.
pub struct BrowserDependencies {
    pub http_client: Arc<dyn HttpClient>,
    /// Holds the pending PKCE verifier across the redirect.
    pub session_store: Arc<dyn SessionStore>,
    pub navigator: Arc<dyn Navigator>,
    /// `None` disables copying.
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub event_bus: EventBus,
}

impl BrowserDependencies {
    /// Construct a dependency bundle with a fresh event bus and no clipboard.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        session_store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http_client,
            session_store,
            navigator,
            clipboard: None,
            event_bus: EventBus::new(DEFAULT_EVENT_BUFFER_SIZE),
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl From<WasmBridgeSet> for BrowserDependencies {
    fn from(set: WasmBridgeSet) -> Self {
        Self {
            http_client: set.http_client,
            session_store: set.session_store,
            navigator: set.navigator,
            clipboard: set.clipboard,
            event_bus: EventBus::new(DEFAULT_EVENT_BUFFER_SIZE),
        }
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// The returned navigator is how the host reports the URL the system browser
/// was redirected back to, before running [`Command::CompleteSignIn`].
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub fn bootstrap_desktop(
    config: core_runtime::config::AppConfig,
) -> Result<(FileBrowser, Arc<SystemNavigator>)> {
    let http_client = match config.request_timeout {
        Some(timeout) => ReqwestHttpClient::with_timeout(timeout),
        None => ReqwestHttpClient::new(),
    }
    .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let navigator = Arc::new(SystemNavigator::new(config.redirect_uri.clone()));
    let deps = BrowserDependencies::new(
        Arc::new(http_client),
        Arc::new(MemorySessionStore::new()),
        navigator.clone(),
    );

    #[cfg(feature = "clipboard")]
    let deps = match bridge_desktop::ArboardClipboard::new() {
        Ok(clipboard) => deps.with_clipboard(Arc::new(clipboard)),
        Err(err) => {
            tracing::warn!(error = %err, "Clipboard unavailable");
            deps
        }
    };

    Ok((FileBrowser::new(config, deps), navigator))
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// The page origin becomes the redirect URI, so the app must be registered
/// with Dropbox under the origin it is served from.
///
/// ```ignore
/// let browser = bootstrap_wasm(AppConfig::builder().client_id(APP_KEY).build()?)?;
/// browser.execute(Command::CompleteSignIn).await;
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub fn bootstrap_wasm(mut config: core_runtime::config::AppConfig) -> Result<FileBrowser> {
    let bridges =
        build_wasm_bridges().map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    config.redirect_uri = bridges.origin.clone();
    Ok(FileBrowser::new(config, BrowserDependencies::from(bridges)))
}
