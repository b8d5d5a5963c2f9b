//! OAuth 2.0 Authorization Code Flow with PKCE
//!
//! Implements the public-client flow of RFC 6749 with RFC 7636 PKCE against
//! the Dropbox OAuth endpoints.
//!
//! # Overview
//!
//! The flow manager handles:
//! - Generating the code verifier and its S256 challenge
//! - Building the authorization URL
//! - Exchanging the authorization code for an access token
//! - Revoking the access token on sign-out
//!
//! # Security
//!
//! - The verifier is 64 bytes from the operating system's secure random source
//! - Only the challenge leaves the app before the exchange
//! - Tokens, codes and verifiers are never logged
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::{OAuthConfig, OAuthFlowManager, PkceVerifier};
//! use std::sync::Arc;
//!
//! # fn example() -> core_auth::Result<()> {
//! # use bridge_traits::http::HttpClient;
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! let config = OAuthConfig::dropbox("app-key", "http://localhost:3000");
//! let flow = OAuthFlowManager::new(config, http_client);
//!
//! let verifier = PkceVerifier::generate()?;
//! let auth_url = flow.build_auth_url(&verifier)?;
//! // Persist the verifier, then send the user to auth_url...
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use core_runtime::config::{AppConfig, DropboxEndpoints};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Number of random bytes behind a code verifier.
pub const CODE_VERIFIER_BYTES: usize = 64;

/// Token lifetime requested from Dropbox: a short-lived token, no refresh token.
pub const TOKEN_ACCESS_TYPE: &str = "online";

/// OAuth 2.0 client configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Dropbox app key
    pub client_id: String,
    /// Redirect URI for the OAuth callback; also where the app returns after sign-in
    pub redirect_uri: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Token revocation endpoint URL
    pub revoke_url: String,
    /// Value of the `token_access_type` authorize parameter, if any
    pub token_access_type: Option<String>,
}

impl OAuthConfig {
    /// Dropbox production endpoints for the given app.
    pub fn dropbox(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self::with_endpoints(client_id, redirect_uri, &DropboxEndpoints::default())
    }

    pub fn with_endpoints(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        endpoints: &DropboxEndpoints,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: endpoints.authorize_url.clone(),
            token_url: endpoints.token_url.clone(),
            revoke_url: endpoints.revoke_url(),
            token_access_type: Some(TOKEN_ACCESS_TYPE.to_string()),
        }
    }

    /// # Errors
    ///
    /// [`AuthError::Config`] when the app config has no client id.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .clone()
            .ok_or_else(|| AuthError::Config("Dropbox app key is not configured".to_string()))?;
        Ok(Self::with_endpoints(
            client_id,
            config.redirect_uri.clone(),
            &config.endpoints,
        ))
    }
}

/// PKCE code verifier.
///
/// Stored in session storage between the redirect to the provider and the
/// redirect back; only its [`challenge`](Self::challenge) is sent with the
/// authorization request.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceVerifier {
    verifier: String,
}

impl PkceVerifier {
    /// Generate a verifier from [`CODE_VERIFIER_BYTES`] bytes of OS randomness,
    /// encoded as unpadded base64url (86 characters).
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; CODE_VERIFIER_BYTES];
        getrandom::getrandom(&mut bytes).map_err(|e| AuthError::Random(e.to_string()))?;
        Ok(Self {
            verifier: URL_SAFE_NO_PAD.encode(bytes),
        })
    }

    /// Restore a verifier read back from storage.
    pub fn from_string(verifier: impl Into<String>) -> Self {
        Self {
            verifier: verifier.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.verifier
    }

    /// S256 challenge: `BASE64URL(SHA256(verifier))` without padding.
    pub fn challenge(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl fmt::Debug for PkceVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkceVerifier")
            .field("verifier", &"[REDACTED]")
            .finish()
    }
}

/// OAuth 2.0 flow manager.
pub struct OAuthFlowManager {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlowManager {
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL carrying the challenge for `verifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL cannot be parsed.
    #[instrument(skip(self, verifier))]
    pub fn build_auth_url(&self, verifier: &PkceVerifier) -> Result<String> {
        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::Config(format!("Invalid auth URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("response_type", "code");
            query.append_pair("code_challenge", &verifier.challenge());
            query.append_pair("code_challenge_method", "S256");
            query.append_pair("redirect_uri", &self.config.redirect_uri);
            if let Some(access_type) = &self.config.token_access_type {
                query.append_pair("token_access_type", access_type);
            }
        }

        debug!("Built authorization URL");
        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The outcome is decided by the presence of `access_token` in the body,
    /// not by the status code.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Network`] if the request could not be sent
    /// - [`AuthError::InvalidResponse`] if the body is not a JSON object
    /// - [`AuthError::Rejected`] carrying `error_description`, `error` or
    ///   `"Unknown error"` when no access token came back
    #[instrument(skip(self, code, verifier))]
    pub async fn exchange_code(&self, code: &str, verifier: &PkceVerifier) -> Result<OAuthTokens> {
        let params = [
            ("code", code),
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", verifier.as_str()),
        ];

        let encoded_body = serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::Config(format!("Failed to encode token request: {}", e)))?;

        let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Bytes::from(encoded_body));

        debug!("Exchanging authorization code for tokens");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status;
        let body: TokenResponse = response.json().map_err(|e| {
            warn!(status, "Token endpoint returned an unreadable body");
            AuthError::InvalidResponse(e.to_string())
        })?;

        match body.access_token.filter(|token| !token.is_empty()) {
            Some(access_token) => {
                info!(status, "Exchanged authorization code for an access token");
                let mut tokens = OAuthTokens::new(access_token);
                tokens.token_type = body.token_type;
                tokens.account_id = body.account_id;
                if let Some(expires_in) = body.expires_in {
                    tokens = tokens.with_expires_in(expires_in);
                }
                Ok(tokens)
            }
            None => {
                let reason = body
                    .error_description
                    .or(body.error)
                    .unwrap_or_else(|| "Unknown error".to_string());
                warn!(status, reason = %reason, "Token endpoint rejected the authorization code");
                Err(AuthError::Rejected(reason))
            }
        }
    }

    /// Revoke `access_token`.
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx answers are returned; callers treat
    /// revocation as best effort.
    #[instrument(skip(self, access_token))]
    pub async fn revoke_token(&self, access_token: &str) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Post, self.config.revoke_url.clone())
            .bearer_token(access_token);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.is_success() {
            debug!("Access token revoked");
            Ok(())
        } else {
            Err(AuthError::Rejected(format!("HTTP {}", response.status)))
        }
    }
}

/// Body of the token endpoint's answer, success or error.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    account_id: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}
