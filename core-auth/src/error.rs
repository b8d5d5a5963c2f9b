use thiserror::Error;

/// Sign-in failures. The `Display` text of each variant is what the user sees.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The token endpoint answered without an access token.
    #[error("Auth failed: {0}")]
    Rejected(String),

    /// The token request never got an answer.
    #[error("Auth error: {0}")]
    Network(String),

    /// The token endpoint answered with something that is not a token response.
    #[error("Auth error: {0}")]
    InvalidResponse(String),

    #[error("Session storage unavailable: {0}")]
    Storage(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Invalid OAuth configuration: {0}")]
    Config(String),

    #[error("Secure random source unavailable: {0}")]
    Random(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
