//! Shared plumbing for the Dropbox browser crates: [`config::AppConfig`]
//! loaded from the environment, `tracing` setup in [`logging`], and the
//! [`events::EventBus`] hosts subscribe to.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result, SETUP_GUIDANCE};
