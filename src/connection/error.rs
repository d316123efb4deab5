//! Failures surfaced by the connection manager.

use std::io;

use thiserror::Error;

/// Transport-level failure returned from
/// [`ConnectionManager::write_line`](super::ConnectionManager::write_line).
///
/// Every variant except [`ShutDown`](Self::ShutDown) leaves the manager
/// disconnected; the next write starts a fresh connection attempt.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No resolved address accepted a TCP connection within the timeout.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// `host:port` that was dialled.
        address: String,
        /// Error reported for the last attempted address.
        #[source]
        source: io::Error,
    },
    /// TLS negotiation or certificate validation failed.
    #[error("TLS handshake with {host} failed: {reason}")]
    Handshake {
        /// Host name presented for verification.
        host: String,
        /// Description reported by the TLS backend.
        reason: String,
    },
    /// Sending on an established connection failed.
    #[error("write to log collector failed: {0}")]
    Write(#[source] io::Error),
    /// The manager was shut down and no longer opens connections.
    #[error("connection manager has been shut down")]
    ShutDown,
}

impl ConnectionError {
    pub(crate) fn handshake(host: &str, reason: impl ToString) -> Self {
        Self::Handshake {
            host: host.to_owned(),
            reason: reason.to_string(),
        }
    }
}
