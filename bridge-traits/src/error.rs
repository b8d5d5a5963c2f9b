use thiserror::Error;

/// Failure reported by a host bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host lacks the capability (no window, storage disabled, no clipboard).
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// No response arrived. Displays the transport's own message, e.g.
    /// `Failed to fetch`.
    #[error("{0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
