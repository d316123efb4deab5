//! Public writer type exported by the crate.

use std::sync::Arc;

use log::debug;

use crate::{
    connection::{ConnectionConfig, ConnectionError, ConnectionManager, TrustStatus},
    formatter::{JsonFormatter, LogFormatter},
    log_entry::LogEntry,
    sink::{LogSink, ShipError},
};

/// Writer shipping entries to the collector as newline-delimited JSON.
///
/// Formatting happens on the calling thread; the resulting line is sent
/// through the shared [`ConnectionManager`]. Dropping the writer closes the
/// connection.
pub struct LogWriter {
    formatter: Arc<dyn LogFormatter>,
    connection: ConnectionManager,
}

impl LogWriter {
    /// Construct a writer using the default JSON document layout.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_formatter(config, JsonFormatter)
    }

    /// Construct a writer that renders lines with `formatter`.
    pub fn with_formatter<F>(config: ConnectionConfig, formatter: F) -> Self
    where
        F: LogFormatter + 'static,
    {
        Self {
            formatter: Arc::new(formatter),
            connection: ConnectionManager::new(config),
        }
    }

    /// Certificate verification in force for this writer.
    pub fn trust_status(&self) -> TrustStatus {
        self.connection.trust_status()
    }

    /// Whether a transport is currently held.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_shut_down()
    }

    /// Close the connection. Later writes fail with [`ShipError::Closed`].
    ///
    /// A write already holding the connection finishes first; no write
    /// reconnects once this returns.
    pub fn close(&self) {
        if !self.is_closed() {
            debug!("logship: writer closed");
        }
        self.connection.shutdown();
    }
}

impl LogSink for LogWriter {
    fn write(&self, entry: &LogEntry) -> Result<(), ShipError> {
        let payload = self.formatter.format(entry);
        match self.connection.write_line(&payload) {
            Err(ConnectionError::ShutDown) => Err(ShipError::Closed),
            result => result.map_err(ShipError::from),
        }
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter")
            .field("connection", &self.connection)
            .field("closed", &self.is_closed())
            .finish()
    }
}
