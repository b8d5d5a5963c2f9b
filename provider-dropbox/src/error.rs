//! Error types for the Dropbox provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Dropbox provider errors
///
/// The `Display` text is what ends up in the status line, so API errors show
/// the server's `error_summary` verbatim.
#[derive(Error, Debug)]
pub enum DropboxError {
    /// Non-2xx answer. `message` is the `error_summary`, or `HTTP <status>`
    /// when the body had none.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never got an answer; the transport's own message.
    #[error("{0}")]
    Network(String),

    /// Failed to parse API response
    #[error("Failed to parse Dropbox response: {0}")]
    Parse(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for Dropbox operations
pub type Result<T> = std::result::Result<T, DropboxError>;

impl DropboxError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DropboxError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for `path/not_found` style errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DropboxError::Api { message, .. } if message.contains("not_found"))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<BridgeError> for DropboxError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Transport(message) => DropboxError::Network(message),
            other => DropboxError::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DropboxError {
    fn from(error: serde_json::Error) -> Self {
        DropboxError::Parse(error.to_string())
    }
}
