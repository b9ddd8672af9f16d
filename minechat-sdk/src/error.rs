//! Error types for the session engine.

use std::time::Duration;

use thiserror::Error;

/// Main error type for session operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the socket layer: DNS resolution, connection
    /// refused, reset, or a failed read/write on an open connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection (EOF on a line read).
    #[error("connection closed by server")]
    ConnectionClosed,

    /// No liveness pulse arrived within the watchdog window.
    #[error("no liveness pulse within {0:?}")]
    LivenessTimeout(Duration),

    /// The server did not recognize the account token.
    #[error("server rejected the account token")]
    InvalidToken,

    /// The server sent something the protocol does not allow.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The consumer side dropped its queues; the session has nothing left
    /// to run for.
    #[error("session queues closed")]
    Shutdown,
}

impl Error {
    /// Returns true if this error is transient and reconnection may help.
    ///
    /// Transient errors cover every network-level failure: the server may
    /// come back, so the supervisor reconnects with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::ConnectionClosed | Error::LivenessTimeout(_)
        )
    }

    /// Returns true if this error is fatal and reconnection won't help.
    ///
    /// A rejected token stays rejected no matter how often we retry, and a
    /// protocol violation means we are no longer talking to a server we
    /// understand.
    pub fn is_fatal(&self) -> bool {
        !self.is_transient()
    }
}

/// Convenience result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
