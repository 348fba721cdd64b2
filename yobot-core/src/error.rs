//! Error types for the bot core.
//!
//! [`YobotError`] is the top-level error; [`TransportError`] describes a failed call against the
//! messaging platform and carries the [`TransportErrorKind`] the update loop uses to pick a retry.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Class of a transport failure. Decides between an immediate and a delayed re-poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection reset by the peer.
    ConnectionReset,
    /// The service answered but the response was unusable (5xx on a send, undecodable body).
    BadResponse,
    /// Anything else (timeouts, DNS, refused connections, 4xx on a send).
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::ConnectionReset => "connection reset",
            TransportErrorKind::BadResponse => "bad response",
            TransportErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A failed call against the messaging platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error for a non-success HTTP status: 5xx is a bad response, everything else is `Other`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = if status >= 500 {
            TransportErrorKind::BadResponse
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, format!("status {}: {}", status, body))
    }

    /// True when the update loop should re-poll without waiting.
    pub fn is_immediately_retryable(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::ConnectionReset | TransportErrorKind::BadResponse
        )
    }
}

/// Top-level error for yobot (transport, handler, file, config, IO).
#[derive(Error, Debug)]
pub enum YobotError {
    #[error("file not found at path {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Unauthorized sender: {0}")]
    Unauthorized(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations; uses [`YobotError`].
pub type Result<T> = std::result::Result<T, YobotError>;
