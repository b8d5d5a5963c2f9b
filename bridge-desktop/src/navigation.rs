//! Navigation through the system browser
//!
//! A desktop process has no address bar of its own. Redirects open the system
//! browser; the "current URL" is whatever the host last reported, typically the
//! redirect URL the user pasted back or a local callback listener received.

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::Navigator;
use std::sync::Mutex;
use tracing::{debug, info};

/// Opens URLs with the platform's default handler.
pub struct SystemNavigator {
    current: Mutex<Option<String>>,
    open_browser: bool,
}

impl SystemNavigator {
    /// Starts at `initial_url`, usually the configured redirect URI.
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(Some(initial_url.into())),
            open_browser: true,
        }
    }

    /// Records redirects without launching a browser.
    pub fn headless(initial_url: impl Into<String>) -> Self {
        Self {
            open_browser: false,
            ..Self::new(initial_url)
        }
    }

    /// Report the URL the browser came back to.
    pub fn set_current_url(&self, url: impl Into<String>) -> Result<()> {
        *self.lock()? = Some(url.into());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.current
            .lock()
            .map_err(|_| BridgeError::OperationFailed("navigator state poisoned".to_string()))
    }
}

impl Navigator for SystemNavigator {
    fn redirect(&self, url: &str) -> Result<()> {
        *self.lock()? = Some(url.to_string());

        if !self.open_browser {
            debug!("Headless navigator; not opening a browser");
            return Ok(());
        }

        info!("Opening system browser");
        open::that(url).map_err(|e| {
            BridgeError::NotAvailable(format!("Could not open a browser: {}", e))
        })
    }

    fn current_url(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn replace_url(&self, url: &str) -> Result<()> {
        *self.lock()? = Some(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_url_drives_current_query() {
        let navigator = SystemNavigator::headless("http://localhost:3000");
        assert_eq!(navigator.current_query().unwrap(), "");

        navigator
            .set_current_url("http://localhost:3000/?code=abc")
            .unwrap();
        assert_eq!(navigator.current_query().unwrap(), "code=abc");

        navigator.replace_url("http://localhost:3000").unwrap();
        assert_eq!(navigator.current_query().unwrap(), "");
    }

    #[test]
    fn test_headless_redirect_records_url() {
        let navigator = SystemNavigator::headless("http://localhost:3000");
        navigator
            .redirect("https://www.dropbox.com/oauth2/authorize?client_id=x")
            .unwrap();
        assert_eq!(
            navigator.current_url().unwrap().as_deref(),
            Some("https://www.dropbox.com/oauth2/authorize?client_id=x")
        );
    }
}
