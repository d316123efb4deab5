//! Configuration consumed by the connection manager.
//!
//! A [`ConnectionConfig`] is built once, either in code or from an INI file
//! via [`load_connection_config`](crate::file_config::load_connection_config),
//! and is read-only for the rest of the writer's life.

use std::{path::PathBuf, time::Duration};

/// Default collector host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default collector port.
pub const DEFAULT_PORT: u16 = 5000;
/// Default connection timeout applied when establishing sockets and
/// completing the TLS handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout applied to socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the log collector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Wrap the TCP stream in TLS.
    pub use_tls: bool,
    /// PEM or DER encoded CA certificate used to pin the collector's chain.
    pub ca_certificate_path: Option<PathBuf>,
    /// Skip certificate and hostname validation entirely. Local development
    /// only.
    pub accept_any_certificate: bool,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            use_tls: true,
            ca_certificate_path: None,
            accept_any_certificate: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Plain TCP configuration targeting `host:port`.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls: false,
            ..Self::default()
        }
    }

    /// TLS configuration targeting `host:port` with platform trust.
    pub fn tls(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls: true,
            ..Self::default()
        }
    }

    pub fn with_ca_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_certificate_path = Some(path.into());
        self
    }

    pub fn with_accept_any_certificate(mut self, accept: bool) -> Self {
        self.accept_any_certificate = accept;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// `host:port` as used in diagnostics.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
