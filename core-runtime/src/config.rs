//! # Application Configuration
//!
//! Provides configuration for the Dropbox file browser core.
//!
//! ## Overview
//!
//! [`AppConfig`] carries the Dropbox app key (OAuth `client_id`), the redirect
//! URI registered for the app, the API endpoints and a few tunables. It is
//! constructed once by the host and passed to the services; nothing reads
//! ambient globals after that.
//!
//! The app key is optional at construction time: a config without one is
//! still valid to build, and the file browser then runs in setup-required
//! mode. [`AppConfig::validate`] reports the missing key as
//! [`Error::MissingClientId`], whose message is the setup guidance.
//!
//! ## Usage
//!
//! ### From the environment (native hosts)
//!
//! ```ignore
//! use core_runtime::config::AppConfig;
//!
//! // Loads .env.local / .env, then reads DROPBOX_APP_KEY and DROPBOX_REDIRECT_URI.
//! let config = AppConfig::from_env()?;
//! ```
//!
//! ### Explicit
//!
//! ```
//! use core_runtime::config::AppConfig;
//!
//! let config = AppConfig::builder()
//!     .client_id("abc123")
//!     .redirect_uri("http://localhost:3000")
//!     .build()
//!     .expect("valid config");
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LoggingConfig};
use std::time::Duration;
use url::Url;

/// Environment variable holding the Dropbox app key.
pub const ENV_APP_KEY: &str = "DROPBOX_APP_KEY";
/// Alternative app key variable used by web-style `.env.local` files.
pub const ENV_APP_KEY_LEGACY: &str = "REACT_APP_DROPBOX_APP_KEY";
/// Environment variable overriding the redirect URI.
pub const ENV_REDIRECT_URI: &str = "DROPBOX_REDIRECT_URI";
/// Environment variable with a `tracing` filter directive.
pub const ENV_LOG_FILTER: &str = "DROPBOX_LOG";
/// Environment variable selecting `pretty`, `json` or `compact` log output.
pub const ENV_LOG_FORMAT: &str = "DROPBOX_LOG_FORMAT";

/// Redirect URI used when none is configured: the local development origin.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000";

/// Maximum number of search matches requested from the provider.
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 20;

/// Dropbox endpoint set.
///
/// Production values come from [`Default`]; tests point every endpoint at a
/// local mock server with [`DropboxEndpoints::with_base_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropboxEndpoints {
    /// User-facing authorization page.
    pub authorize_url: String,
    /// OAuth token endpoint (form-encoded code exchange).
    pub token_url: String,
    /// RPC base; routes such as `files/search_v2` are appended.
    pub api_base: String,
    /// Content base for `files/download` and `files/upload`.
    pub content_base: String,
}

impl Default for DropboxEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: "https://www.dropbox.com/oauth2/authorize".to_string(),
            token_url: "https://api.dropboxapi.com/oauth2/token".to_string(),
            api_base: "https://api.dropboxapi.com/2".to_string(),
            content_base: "https://content.dropboxapi.com/2".to_string(),
        }
    }
}

impl DropboxEndpoints {
    /// All endpoints rooted at `base`, keeping the production path layout.
    pub fn with_base_url(base: impl AsRef<str>) -> Self {
        let base = base.as_ref().trim_end_matches('/');
        Self {
            authorize_url: format!("{}/oauth2/authorize", base),
            token_url: format!("{}/oauth2/token", base),
            api_base: format!("{}/2", base),
            content_base: format!("{}/content/2", base),
        }
    }

    /// URL of an RPC route, e.g. `rpc("files/move_v2")`.
    pub fn rpc(&self, route: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), route)
    }

    /// URL of a content route, e.g. `content("files/upload")`.
    pub fn content(&self, route: &str) -> String {
        format!("{}/{}", self.content_base.trim_end_matches('/'), route)
    }

    /// Token revocation endpoint.
    pub fn revoke_url(&self) -> String {
        self.rpc("auth/token/revoke")
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("api_base", &self.api_base),
            ("content_base", &self.content_base),
        ] {
            Url::parse(value)
                .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", name, value, e)))?;
        }
        Ok(())
    }
}

/// Configuration for the file browser core.
///
/// Use [`AppConfigBuilder`] or [`AppConfig::from_env`] to construct instances.
#[derive(Clone)]
pub struct AppConfig {
    /// Dropbox app key. `None` puts the browser in setup-required mode.
    pub client_id: Option<String>,

    /// Redirect URI registered with the Dropbox app; the app's own origin.
    pub redirect_uri: String,

    pub endpoints: DropboxEndpoints,

    /// `options.max_results` for `files/search_v2`.
    pub search_max_results: u32,

    /// Per-request timeout handed to the HTTP bridge. `None` leaves the
    /// transport default in place.
    pub request_timeout: Option<Duration>,

    pub logging: LoggingConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id.as_ref().map(|_| "[set]"))
            .field("redirect_uri", &self.redirect_uri)
            .field("endpoints", &self.endpoints)
            .field("search_max_results", &self.search_max_results)
            .field("request_timeout", &self.request_timeout)
            .field("log_format", &self.logging.format)
            .finish()
    }
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Builds a config from the process environment.
    ///
    /// `.env.local` and then `.env` are loaded first when present; variables
    /// already set in the environment take precedence over both files.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self> {
        for file in [".env.local", ".env"] {
            match dotenvy::from_filename(file) {
                Ok(path) => tracing::debug!(file = %path.display(), "Loaded environment file"),
                Err(e) if e.not_found() => {}
                Err(e) => {
                    return Err(Error::Config(format!("Failed to read {}: {}", file, e)));
                }
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(key) = non_empty(ENV_APP_KEY).or_else(|| non_empty(ENV_APP_KEY_LEGACY)) {
            builder = builder.client_id(key.trim());
        }

        if let Some(uri) = non_empty(ENV_REDIRECT_URI) {
            builder = builder.redirect_uri(uri.trim());
        }

        let mut logging = LoggingConfig::default();
        if let Some(filter) = non_empty(ENV_LOG_FILTER) {
            logging = logging.with_filter(filter);
        }
        if let Some(format) = non_empty(ENV_LOG_FORMAT) {
            logging = logging.with_format(format.parse::<LogFormat>()?);
        }

        builder.logging(logging).build()
    }

    /// Validates the configuration.
    ///
    /// Returns [`Error::MissingClientId`] when no app key is set; every other
    /// check already ran in [`AppConfigBuilder::build`].
    pub fn validate(&self) -> Result<()> {
        match self.client_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(()),
            _ => Err(Error::MissingClientId),
        }
    }

    /// Whether the browser has to show setup instructions instead of working.
    pub fn requires_setup(&self) -> bool {
        matches!(self.validate(), Err(Error::MissingClientId))
    }
}

/// Builder for [`AppConfig`].
#[derive(Default)]
pub struct AppConfigBuilder {
    client_id: Option<String>,
    redirect_uri: Option<String>,
    endpoints: Option<DropboxEndpoints>,
    search_max_results: Option<u32>,
    request_timeout: Option<Duration>,
    logging: Option<LoggingConfig>,
}

impl AppConfigBuilder {
    /// Sets the Dropbox app key.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the redirect URI. Defaults to [`DEFAULT_REDIRECT_URI`].
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    pub fn endpoints(mut self, endpoints: DropboxEndpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    pub fn search_max_results(mut self, max: u32) -> Self {
        self.search_max_results = Some(max);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the redirect URI or an endpoint is not an
    ///   absolute URL, or `search_max_results` is outside `1..=1000`
    ///
    /// A missing client id is not an error here; see [`AppConfig::validate`].
    pub fn build(self) -> Result<AppConfig> {
        let redirect_uri = self
            .redirect_uri
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        Url::parse(&redirect_uri).map_err(|e| {
            Error::Config(format!("Invalid redirect URI '{}': {}", redirect_uri, e))
        })?;

        let endpoints = self.endpoints.unwrap_or_default();
        endpoints.validate()?;

        let search_max_results = self
            .search_max_results
            .unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
        if !(1..=1000).contains(&search_max_results) {
            return Err(Error::Config(format!(
                "search_max_results must be between 1 and 1000, got {}",
                search_max_results
            )));
        }

        Ok(AppConfig {
            client_id: self.client_id.filter(|id| !id.trim().is_empty()),
            redirect_uri,
            endpoints,
            search_max_results,
            request_timeout: self.request_timeout,
            logging: self.logging.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_builder_defaults() {
        let config = AppConfig::builder().client_id("key").build().unwrap();

        assert_eq!(config.client_id.as_deref(), Some("key"));
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.endpoints, DropboxEndpoints::default());
        assert_eq!(config.search_max_results, 20);
        assert!(config.request_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_client_id_builds_but_fails_validation() {
        let config = AppConfig::builder().build().unwrap();
        assert!(config.requires_setup());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::MissingClientId));
        assert!(err.to_string().contains("DROPBOX_APP_KEY"));
        assert!(err.to_string().contains("https://www.dropbox.com/developers/apps"));
    }

    #[test]
    fn test_blank_client_id_is_treated_as_missing() {
        let config = AppConfig::builder().client_id("   ").build().unwrap();
        assert!(config.client_id.is_none());
        assert!(config.requires_setup());
    }

    #[test]
    fn test_rejects_relative_redirect_uri() {
        let result = AppConfig::builder().redirect_uri("/callback").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_out_of_range_search_limit() {
        assert!(AppConfig::builder().search_max_results(0).build().is_err());
        assert!(AppConfig::builder().search_max_results(1001).build().is_err());
        assert!(AppConfig::builder().search_max_results(1000).build().is_ok());
    }

    #[test]
    fn test_endpoint_routes() {
        let endpoints = DropboxEndpoints::default();
        assert_eq!(
            endpoints.rpc("files/search_v2"),
            "https://api.dropboxapi.com/2/files/search_v2"
        );
        assert_eq!(
            endpoints.content("files/download"),
            "https://content.dropboxapi.com/2/files/download"
        );
        assert_eq!(
            endpoints.revoke_url(),
            "https://api.dropboxapi.com/2/auth/token/revoke"
        );
    }

    #[test]
    fn test_endpoints_with_base_url() {
        let endpoints = DropboxEndpoints::with_base_url("http://127.0.0.1:9999/");
        assert_eq!(endpoints.token_url, "http://127.0.0.1:9999/oauth2/token");
        assert_eq!(
            endpoints.rpc("files/delete_v2"),
            "http://127.0.0.1:9999/2/files/delete_v2"
        );
        assert_eq!(
            endpoints.content("files/upload"),
            "http://127.0.0.1:9999/content/2/files/upload"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let endpoints = DropboxEndpoints {
            token_url: "not a url".to_string(),
            ..DropboxEndpoints::default()
        };
        assert!(AppConfig::builder().endpoints(endpoints).build().is_err());
    }

    #[test]
    fn test_from_lookup_prefers_primary_key() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_APP_KEY, "primary"),
            (ENV_APP_KEY_LEGACY, "legacy"),
            (ENV_REDIRECT_URI, "https://files.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.client_id.as_deref(), Some("primary"));
        assert_eq!(config.redirect_uri, "https://files.example.com");
    }

    #[test]
    fn test_from_lookup_falls_back_to_legacy_key() {
        let config =
            AppConfig::from_lookup(lookup(&[(ENV_APP_KEY, ""), (ENV_APP_KEY_LEGACY, "legacy")]))
                .unwrap();
        assert_eq!(config.client_id.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_from_lookup_without_key_requires_setup() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.requires_setup());
    }

    #[test]
    fn test_from_lookup_logging() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_LOG_FILTER, "core_auth=trace"),
            (ENV_LOG_FORMAT, "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.logging.filter.as_deref(), Some("core_auth=trace"));
        assert_eq!(config.logging.format, LogFormat::Json);

        assert!(AppConfig::from_lookup(lookup(&[(ENV_LOG_FORMAT, "xml")])).is_err());
    }

    #[test]
    fn test_debug_hides_client_id() {
        let config = AppConfig::builder().client_id("secret-key").build().unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[set]"));
    }
}
