use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens returned by a successful authorization-code exchange.
///
/// Dropbox issues short-lived access tokens and, with
/// `token_access_type=online`, no refresh token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Dropbox account id (`dbid:...`), when returned.
    pub account_id: Option<String>,
}

impl OAuthTokens {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_at: None,
            account_id: None,
        }
    }

    pub fn with_expires_in(mut self, seconds: i64) -> Self {
        self.expires_at = Some(Utc::now() + chrono::Duration::seconds(seconds));
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// `false` when the provider did not report a lifetime.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Utc::now() >= at)
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// An authenticated session. Lives only in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub account_id: Option<String>,
    pub token_type: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<OAuthTokens> for Session {
    fn from(tokens: OAuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            account_id: tokens.account_id,
            token_type: tokens.token_type,
            expires_at: tokens.expires_at,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("account_id", &self.account_id)
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    /// Redirected to the provider, waiting for the code to come back.
    SigningIn,
    SignedIn,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::SigningIn => write!(f, "Signing In..."),
            AuthState::SignedIn => write!(f, "Signed In"),
        }
    }
}

/// OAuth parameters found in the query string the provider redirected back with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl RedirectParams {
    /// Parses a query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// User-facing reason when the provider redirected back with an error.
    pub fn error_message(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_oauth_tokens_debug_is_redacted() {
        let tokens = OAuthTokens::new("sl.secret").with_account_id("dbid:1");
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("sl.secret"));
        assert!(debug.contains("dbid:1"));
    }

    #[test]
    fn test_oauth_tokens_expiry() {
        assert!(!OAuthTokens::new("t").is_expired());
        assert!(!OAuthTokens::new("t").with_expires_in(14400).is_expired());

        let mut tokens = OAuthTokens::new("t");
        tokens.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(tokens.is_expired());
    }

    #[test]
    fn test_session_from_tokens() {
        let session: Session = OAuthTokens::new("sl.abc")
            .with_token_type("bearer")
            .with_account_id("dbid:xyz")
            .into();
        assert_eq!(session.access_token, "sl.abc");
        assert_eq!(session.account_id.as_deref(), Some("dbid:xyz"));
        assert_eq!(session.token_type.as_deref(), Some("bearer"));
        assert!(!format!("{:?}", session).contains("sl.abc"));
    }

    #[test]
    fn test_auth_state() {
        assert_eq!(AuthState::default(), AuthState::SignedOut);
        assert!(AuthState::SignedIn.is_authenticated());
        assert!(!AuthState::SigningIn.is_authenticated());
        assert_eq!(AuthState::SigningIn.to_string(), "Signing In...");
    }

    #[test]
    fn test_redirect_params_code() {
        let params = RedirectParams::from_query("?code=abc%2B1&state=ignored");
        assert_eq!(params.code.as_deref(), Some("abc+1"));
        assert!(params.error_message().is_none());
    }

    #[test]
    fn test_redirect_params_error() {
        let params =
            RedirectParams::from_query("error=access_denied&error_description=The+user+chose+not+to+give+your+app+access");
        assert!(params.code.is_none());
        assert_eq!(
            params.error_message().as_deref(),
            Some("The user chose not to give your app access")
        );

        let params = RedirectParams::from_query("error=access_denied");
        assert_eq!(params.error_message().as_deref(), Some("access_denied"));
    }

    #[test]
    fn test_redirect_params_empty() {
        assert_eq!(RedirectParams::from_query(""), RedirectParams::default());
        assert!(RedirectParams::from_query("code=").code.is_none());
    }
}
