//! # Authentication Module
//!
//! OAuth 2.0 Authorization Code flow with PKCE for Dropbox.
//!
//! ## Overview
//!
//! This module signs a single user into Dropbox from a public client: no
//! client secret, no refresh token. The access token lives in memory only;
//! the one piece of state that has to survive the redirect round trip, the
//! code verifier, is kept in the host's session-scoped storage.
//!
//! ## Features
//!
//! - PKCE verifier/challenge generation (S256)
//! - Authorization URL construction and redirect through the host navigator
//! - Exactly-once code exchange
//! - Best-effort token revocation on sign-out
//! - Auth state event emission

pub mod error;
pub mod manager;
pub mod oauth;
pub mod pending;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::AuthManager;
pub use oauth::{OAuthConfig, OAuthFlowManager, PkceVerifier};
pub use pending::{PendingAuthStore, CODE_VERIFIER_KEY};
pub use types::{AuthState, OAuthTokens, RedirectParams, Session};
