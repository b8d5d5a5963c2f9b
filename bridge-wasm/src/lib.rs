//! Browser bridges, built on `web-sys`.
//!
//! | Type | Browser API |
//! |------|-------------|
//! | [`WasmHttpClient`] | `fetch`, aborted through `AbortController` on timeout |
//! | [`WasmSessionStore`] | `window.sessionStorage` |
//! | [`WindowNavigator`] | `window.location`, `history.replaceState` |
//! | [`WasmClipboard`] | `navigator.clipboard.writeText` |
//!
//! [`build_wasm_bridges`] constructs all of them at once. The crate is empty
//! on targets other than `wasm32`.

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod clipboard;
pub mod error;
pub mod http;
pub mod navigation;
pub mod storage;

pub use bootstrap::{build_wasm_bridges, WasmBridgeSet};
pub use clipboard::WasmClipboard;
pub use error::{js_error, WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use navigation::WindowNavigator;
pub use storage::WasmSessionStore;
