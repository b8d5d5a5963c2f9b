//! Thread-safety bound that depends on the target.
//!
//! Native hosts share bridge objects between tokio tasks, so they must be
//! `Send + Sync`. Browser handles (`web_sys::Window`, `Storage`, ...) are
//! neither, and wasm32 runs on one thread anyway.

#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> PlatformSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}
