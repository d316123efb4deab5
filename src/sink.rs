//! Caller-facing trait for anything that accepts log entries.

use thiserror::Error;

use crate::{connection::ConnectionError, level::LogLevel, log_entry::LogEntry};

/// Error returned by [`LogSink::write`].
#[derive(Debug, Error)]
pub enum ShipError {
    /// The transport failed; the next write reconnects.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// The sink has been closed and accepts no further entries.
    #[error("log writer is closed")]
    Closed,
}

/// Trait implemented by log destinations.
///
/// `LogSink` is `Send + Sync` so a single sink can be shared by every thread
/// in the process. Writes are synchronous: `Ok` means the line was handed to
/// the transport.
pub trait LogSink: Send + Sync {
    /// Ship one entry.
    fn write(&self, entry: &LogEntry) -> Result<(), ShipError>;

    /// Ship `message` at `Info`, stamped with the current time.
    fn log(&self, message: &str) -> Result<(), ShipError> {
        self.log_at(LogLevel::Info, message)
    }

    /// Ship `message` at `level`, stamped with the current time.
    fn log_at(&self, level: LogLevel, message: &str) -> Result<(), ShipError> {
        self.write(&LogEntry::new(level, message))
    }
}
