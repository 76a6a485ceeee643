//! Error types for the client.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A command was issued while the connection is not up.
    /// Commands are never queued; the caller decides whether to retry.
    #[error("not connected")]
    NotConnected,

    /// WebSocket transport error
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
