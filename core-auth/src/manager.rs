//! # Authentication Manager
//!
//! Orchestrates the Dropbox PKCE sign-in: starting the redirect, completing
//! the code exchange once the browser comes back, and signing out.
//!
//! ## Overview
//!
//! The `AuthManager` owns the in-memory [`Session`], keeps the pending code
//! verifier in the host's [`SessionStore`], drives the host [`Navigator`] and
//! emits [`AuthEvent`]s on the application's event bus.
//!
//! ## Usage
//!
//! ```no_run
//! use bridge_traits::{MemorySessionStore, Navigator};
//! use core_auth::{AuthManager, OAuthConfig};
//! use core_runtime::events::EventBus;
//! use std::sync::Arc;
//! # use bridge_traits::http::HttpClient;
//!
//! # async fn example() -> core_auth::Result<()> {
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! # let navigator: Arc<dyn Navigator> = todo!();
//! let manager = AuthManager::new(
//!     OAuthConfig::dropbox("app-key", "http://localhost:3000"),
//!     http_client,
//!     Arc::new(MemorySessionStore::new()),
//!     navigator,
//!     EventBus::new(100),
//! );
//!
//! // On page load: finishes a sign-in if Dropbox just redirected back.
//! if manager.complete_sign_in().await?.is_none() {
//!     manager.begin_sign_in().await?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::oauth::{OAuthConfig, OAuthFlowManager, PkceVerifier};
use crate::pending::PendingAuthStore;
use crate::types::{AuthState, RedirectParams, Session};
use bridge_traits::{http::HttpClient, storage::SessionStore, Navigator};
use core_runtime::config::AppConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

/// Sign-in orchestrator for a single Dropbox account.
pub struct AuthManager {
    flow: OAuthFlowManager,
    pending: PendingAuthStore,
    navigator: Arc<dyn Navigator>,
    event_bus: EventBus,
    session: RwLock<Option<Session>>,
    state: RwLock<AuthState>,
    /// Held across a code exchange so a redirect is consumed at most once.
    exchange_lock: Mutex<()>,
}

impl AuthManager {
    pub fn new(
        config: OAuthConfig,
        http_client: Arc<dyn HttpClient>,
        session_store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            flow: OAuthFlowManager::new(config, http_client),
            pending: PendingAuthStore::new(session_store),
            navigator,
            event_bus,
            session: RwLock::new(None),
            state: RwLock::new(AuthState::SignedOut),
            exchange_lock: Mutex::new(()),
        }
    }

    /// Build a manager from the application config.
    ///
    /// # Errors
    ///
    /// [`AuthError::Config`] when no app key is configured.
    pub fn from_app_config(
        config: &AppConfig,
        http_client: Arc<dyn HttpClient>,
        session_store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        event_bus: EventBus,
    ) -> Result<Self> {
        let oauth = OAuthConfig::from_app_config(config)?;
        Ok(Self::new(
            oauth,
            http_client,
            session_store,
            navigator,
            event_bus,
        ))
    }

    pub fn config(&self) -> &OAuthConfig {
        self.flow.config()
    }

    /// Starts a sign-in.
    ///
    /// Generates a fresh verifier, stores it (replacing any pending one) and
    /// redirects the host to the authorization page.
    ///
    /// # Returns
    ///
    /// The authorization URL, for hosts that cannot navigate by themselves.
    ///
    /// # Errors
    ///
    /// - `AuthError::Random` - the OS random source failed
    /// - `AuthError::Storage` - the verifier could not be stored
    /// - `AuthError::Navigation` - the host refused the redirect
    #[instrument(skip(self))]
    pub async fn begin_sign_in(&self) -> Result<String> {
        let verifier = PkceVerifier::generate()?;
        let auth_url = self.flow.build_auth_url(&verifier)?;

        self.pending.save(&verifier).await?;
        self.set_state(AuthState::SigningIn).await;
        self.event_bus.emit(CoreEvent::Auth(AuthEvent::SigningIn)).ok();

        info!("Redirecting to the Dropbox authorization page");
        self.navigator
            .redirect(&auth_url)
            .map_err(|e| AuthError::Navigation(e.to_string()))?;

        Ok(auth_url)
    }

    /// Completes a sign-in from the host's current URL.
    ///
    /// See [`complete_sign_in_with_query`](Self::complete_sign_in_with_query).
    #[instrument(skip(self))]
    pub async fn complete_sign_in(&self) -> Result<Option<Session>> {
        let query = self
            .navigator
            .current_query()
            .map_err(|e| AuthError::Navigation(e.to_string()))?;
        self.complete_sign_in_with_query(&query).await
    }

    /// Completes a sign-in from the query string Dropbox redirected back with.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))` - the code was exchanged; the verifier is gone
    ///   and the host URL no longer carries the code
    /// - `Ok(None)` - nothing to complete: no code, or a code without a
    ///   pending verifier (already consumed, or started in another session)
    ///
    /// # Errors
    ///
    /// - `AuthError::Rejected` - the token endpoint refused the code, or the
    ///   user denied access; the message is ready to show
    /// - `AuthError::Network` / `AuthError::InvalidResponse` - the exchange
    ///   did not get a usable answer
    ///
    /// On an exchange failure the verifier stays stored.
    #[instrument(skip(self, query))]
    pub async fn complete_sign_in_with_query(&self, query: &str) -> Result<Option<Session>> {
        let params = RedirectParams::from_query(query);
        let _exchange = self.exchange_lock.lock().await;

        let Some(code) = params.code.as_deref() else {
            if let Some(message) = params.error_message() {
                return self.abandon_pending(message).await;
            }
            return Ok(None);
        };

        let Some(verifier) = self.pending.load().await? else {
            warn!("Authorization code present but no pending verifier; ignoring");
            return Ok(None);
        };

        let tokens = match self.flow.exchange_code(code, &verifier).await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!(error = %e, "Code exchange failed");
                self.set_state(AuthState::SignedOut).await;
                self.emit_error(e.to_string());
                return Err(e);
            }
        };

        if let Err(e) = self.pending.clear().await {
            warn!(error = %e, "Failed to clear code verifier after exchange");
        }

        let session = Session::from(tokens);
        *self.session.write().await = Some(session.clone());
        self.set_state(AuthState::SignedIn).await;

        if let Err(e) = self.navigator.replace_url(&self.flow.config().redirect_uri) {
            warn!(error = %e, "Failed to drop the authorization code from the URL");
        }

        self.event_bus
            .emit(CoreEvent::Auth(AuthEvent::SignedIn {
                account_id: session.account_id.clone(),
            }))
            .ok();

        info!(account_id = ?session.account_id, "Sign-in completed");
        Ok(Some(session))
    }

    /// Signs out.
    ///
    /// The token is revoked on a best-effort basis; revoke failures are only
    /// logged. The session and any pending verifier are always cleared.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        let session = self.session.write().await.take();

        if let Some(session) = session {
            match self.flow.revoke_token(&session.access_token).await {
                Ok(()) => debug!("Token revoked"),
                Err(e) => debug!(error = %e, "Token revoke failed; signing out locally"),
            }
        }

        if let Err(e) = self.pending.clear().await {
            warn!(error = %e, "Failed to clear pending verifier");
        }

        self.set_state(AuthState::SignedOut).await;
        self.event_bus.emit(CoreEvent::Auth(AuthEvent::SignedOut)).ok();
        info!("Signed out");
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Bearer token of the current session.
    pub async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn auth_state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn abandon_pending(&self, message: String) -> Result<Option<Session>> {
        if self.pending.load().await?.is_none() {
            debug!("Redirect carried an error but no sign-in is pending");
            return Ok(None);
        }

        self.pending.clear().await?;
        self.set_state(AuthState::SignedOut).await;
        warn!(reason = %message, "Authorization was not granted");
        self.emit_error(message.clone());
        Err(AuthError::Rejected(message))
    }

    async fn set_state(&self, state: AuthState) {
        *self.state.write().await = state;
    }

    fn emit_error(&self, message: String) {
        self.event_bus
            .emit(CoreEvent::Auth(AuthEvent::AuthError { message }))
            .ok();
    }
}
