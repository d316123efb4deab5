//! Connection to the log collector.
//!
//! This module defines [`ConnectionManager`], which owns a single TCP or TLS
//! stream to the collector, opens it on demand, and replaces it when the
//! peer goes away. Certificate verification follows [`TrustPolicy`], pinning
//! the collector to a caller supplied CA when one is configured.

mod config;
mod error;
mod manager;
mod transport;
mod trust;


pub use config::{
    ConnectionConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_WRITE_TIMEOUT,
};
pub use error::ConnectionError;
pub use manager::ConnectionManager;
pub use transport::{ActiveConnection, connect_transport};
pub use trust::{TrustPolicy, TrustStatus, load_ca_certificate};
