//! Certificate trust decisions for TLS connections.
//!
//! The collector's certificate is judged in this order:
//!
//! 1. `accept_any_certificate` accepts everything (insecure, logged).
//! 2. Without a usable CA the platform verifier decides, including the
//!    hostname check.
//! 3. With a CA the hostname must match and the chain must end at that CA;
//!    the platform roots are not consulted and revocation is not checked.
//!
//! A CA that cannot be loaded degrades to step 2. The degradation is reported
//! through [`TrustStatus::Fallback`] and a warning rather than an error.

use std::{fs, path::Path, sync::Arc};

use log::warn;
use native_tls::{Certificate, Protocol, TlsConnector};

use crate::config::ConfigError;

use super::config::ConnectionConfig;

/// Observable outcome of resolving the configured trust settings.
#[derive(Clone, Debug)]
pub enum TrustStatus {
    /// TLS is disabled or no CA path was configured; platform roots apply.
    NotConfigured,
    /// Every certificate is accepted.
    AcceptAny,
    /// Certificates must chain to the configured CA.
    Pinned,
    /// A CA was configured but could not be loaded; platform roots apply.
    Fallback(Arc<ConfigError>),
}

impl TrustStatus {
    /// True when the configured CA is not in force despite being requested.
    pub fn is_fallback(&self) -> bool {
        matches!(self, TrustStatus::Fallback(_))
    }
}

/// Verification strategy applied to one TLS connector.
#[derive(Clone)]
pub enum TrustPolicy {
    AcceptAny,
    Platform,
    Pinned(Certificate),
}

impl TrustPolicy {
    /// Build a TLS 1.2+ connector enforcing this policy.
    pub fn connector(&self) -> Result<TlsConnector, native_tls::Error> {
        let mut builder = TlsConnector::builder();
        builder.min_protocol_version(Some(Protocol::Tlsv12));
        match self {
            TrustPolicy::AcceptAny => {
                builder.danger_accept_invalid_certs(true);
                builder.danger_accept_invalid_hostnames(true);
            }
            TrustPolicy::Platform => {}
            TrustPolicy::Pinned(ca) => {
                builder.disable_built_in_roots(true);
                builder.add_root_certificate(ca.clone());
            }
        }
        builder.build()
    }
}

impl std::fmt::Debug for TrustPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TrustPolicy::AcceptAny => "AcceptAny",
            TrustPolicy::Platform => "Platform",
            TrustPolicy::Pinned(_) => "Pinned",
        };
        f.write_str(name)
    }
}

/// Read a CA certificate, accepting PEM first and DER second.
pub fn load_ca_certificate(path: &Path) -> Result<Certificate, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::CaCertificateUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Certificate::from_pem(&bytes)
        .or_else(|_| Certificate::from_der(&bytes))
        .map_err(|err| ConfigError::CaCertificateInvalid {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
}

enum CachedCa {
    Unloaded,
    Absent,
    Loaded(Certificate),
    Failed(Arc<ConfigError>),
}

/// CA certificate parsed at most once per connection manager.
pub(crate) struct CaCache {
    state: CachedCa,
}

impl CaCache {
    pub(crate) fn new() -> Self {
        Self {
            state: CachedCa::Unloaded,
        }
    }

    fn ensure_loaded(&mut self, config: &ConnectionConfig) {
        if !matches!(self.state, CachedCa::Unloaded) {
            return;
        }
        let path = config
            .ca_certificate_path
            .as_deref()
            .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty());
        self.state = match path {
            None => CachedCa::Absent,
            Some(path) => match load_ca_certificate(path) {
                Ok(cert) => CachedCa::Loaded(cert),
                Err(err) => {
                    warn!(
                        "logship: {err}; falling back to platform certificate verification"
                    );
                    CachedCa::Failed(Arc::new(err))
                }
            },
        };
    }

    /// Report how certificates will be judged, loading the CA if needed.
    pub(crate) fn status(&mut self, config: &ConnectionConfig) -> TrustStatus {
        if !config.use_tls {
            return TrustStatus::NotConfigured;
        }
        if config.accept_any_certificate {
            return TrustStatus::AcceptAny;
        }
        self.ensure_loaded(config);
        match &self.state {
            CachedCa::Loaded(_) => TrustStatus::Pinned,
            CachedCa::Failed(err) => TrustStatus::Fallback(Arc::clone(err)),
            CachedCa::Unloaded | CachedCa::Absent => TrustStatus::NotConfigured,
        }
    }

    /// Resolve the policy for the next handshake.
    pub(crate) fn policy(&mut self, config: &ConnectionConfig) -> TrustPolicy {
        if config.accept_any_certificate {
            warn!(
                "logship: accepting any certificate from {}; this is insecure and \
                 intended for local development only",
                config.address()
            );
            return TrustPolicy::AcceptAny;
        }
        self.ensure_loaded(config);
        match &self.state {
            CachedCa::Loaded(cert) => TrustPolicy::Pinned(cert.clone()),
            CachedCa::Unloaded | CachedCa::Absent | CachedCa::Failed(_) => TrustPolicy::Platform,
        }
    }
}
