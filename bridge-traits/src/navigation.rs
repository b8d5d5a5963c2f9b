//! Navigation Abstraction
//!
//! The authorization-code flow leaves the application: the host sends the user
//! to the provider's authorize page and later reloads the app with `?code=...`
//! in the query string. This trait covers both directions plus removing the
//! query once it has been consumed.

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Host navigation capability.
pub trait Navigator: PlatformSendSync {
    /// Send the user to `url`. In a browser this replaces the current page.
    fn redirect(&self, url: &str) -> Result<()>;

    /// Full URL the app is currently showing, if the host has one.
    fn current_url(&self) -> Result<Option<String>>;

    /// Query component of [`current_url`](Self::current_url) without the
    /// leading `?`. Empty when there is none.
    fn current_query(&self) -> Result<String> {
        Ok(self
            .current_url()?
            .and_then(|url| {
                url.split_once('?')
                    .map(|(_, rest)| rest.split('#').next().unwrap_or_default().to_string())
            })
            .unwrap_or_default())
    }

    /// Replace the visible URL without reloading or adding a history entry.
    fn replace_url(&self, url: &str) -> Result<()>;
}
