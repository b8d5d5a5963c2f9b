use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Carries the provider's own wording ("Auth failed: ...").
    #[error(transparent)]
    Auth(#[from] core_auth::AuthError),

    #[error(transparent)]
    Provider(#[from] provider_dropbox::DropboxError),

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
