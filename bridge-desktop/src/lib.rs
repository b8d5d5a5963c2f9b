//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `Navigator` opening the system browser via `open`
//! - `SessionStore` is the in-memory store from `bridge-traits`
//! - `Clipboard` using `arboard` (feature `clipboard`)
//!
//! ## Feature Flags
//!
//! - `clipboard`: Enable OS clipboard integration
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SystemNavigator};
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let navigator = SystemNavigator::new("http://localhost:3000");
//! ```

mod http;
mod navigation;

#[cfg(feature = "clipboard")]
mod clipboard;

pub use bridge_traits::storage::MemorySessionStore;
pub use http::ReqwestHttpClient;
pub use navigation::SystemNavigator;

#[cfg(feature = "clipboard")]
pub use clipboard::ArboardClipboard;
