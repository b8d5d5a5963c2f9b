//! # Host bridges
//!
//! Everything the file browser needs from its host, as traits:
//!
//! | Trait | Desktop (`bridge-desktop`) | Browser (`bridge-wasm`) |
//! |-------|----------------------------|-------------------------|
//! | [`HttpClient`] | `reqwest` | `fetch` |
//! | [`SessionStore`] | process memory | `sessionStorage` |
//! | [`Navigator`] | system browser + pasted URL | `window.location` / `history` |
//! | [`Clipboard`] | `arboard` (feature `clipboard`) | `navigator.clipboard` |
//! | [`LoggerSink`] | host supplied | host supplied |
//!
//! Implementations map their native failures onto [`BridgeError`]. Transport
//! messages reach the user's status line unchanged, so keep them readable.
//!
//! The async traits use `async_trait`, without `Send` futures on wasm32; see
//! [`platform::PlatformSendSync`].

pub mod clipboard;
pub mod error;
pub mod http;
pub mod logger;
pub mod navigation;
pub mod platform;
pub mod storage;

pub use clipboard::Clipboard;
pub use error::BridgeError;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logger::{LogEntry, LogLevel, LoggerSink};
pub use navigation::Navigator;
pub use storage::{MemorySessionStore, SessionStore};
