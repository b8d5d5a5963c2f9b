//! Workspace facade crate.
//!
//! Exposes the feature flags that map onto the individual workspace crates so a
//! host application can depend on `dbx-workspace` and pick a platform
//! (`desktop-shims` or `wasm`) without wiring each crate by hand.

#[cfg(any(feature = "desktop-shims", feature = "wasm", feature = "clipboard"))]
pub use core_service::*;
