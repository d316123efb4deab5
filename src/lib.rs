//! Minimal log shipping client.
//!
//! `logship` renders [`LogEntry`] values as newline-delimited JSON and sends
//! them to a Logstash-style collector over one long-lived TCP or TLS
//! connection. The connection is opened on the first write, re-opened on the
//! first write after a failure, and may be pinned to a private CA.
//!
//! ```no_run
//! use logship::{ConnectionConfig, LogEntry, LogLevel, LogSink, LogWriter};
//!
//! let writer = LogWriter::new(
//!     ConnectionConfig::tls("logs.internal", 5000).with_ca_certificate("certs/ca.crt"),
//! );
//! let entry = LogEntry::new(LogLevel::Info, "login")
//!     .with_application("billing")
//!     .with_property("userId", "u1");
//! writer.write(&entry)?;
//! # Ok::<(), logship::ShipError>(())
//! ```

pub mod config;
pub mod connection;
pub mod file_config;
pub mod formatter;
pub mod level;
pub mod log_entry;
pub mod sink;
pub mod writer;

pub use config::ConfigError;
pub use connection::{
    ConnectionConfig, ConnectionError, ConnectionManager, TrustPolicy, TrustStatus,
};
pub use file_config::{load_connection_config, parse_connection_config};
pub use formatter::{JsonFormatter, LogFormatter, format_entry};
pub use level::{LogLevel, ParseLevelError};
pub use log_entry::{ExceptionInfo, LogEntry};
pub use sink::{LogSink, ShipError};
pub use writer::LogWriter;
