//! Configuration errors shared by the INI loader and CA certificate loading.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that may occur while loading configuration or trust material.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured CA certificate file could not be read.
    #[error("failed to read CA certificate {}: {source}", path.display())]
    CaCertificateUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The CA certificate file is neither valid PEM nor DER.
    #[error("CA certificate {} is invalid: {reason}", path.display())]
    CaCertificateInvalid { path: PathBuf, reason: String },
    /// The configuration file does not exist.
    #[error("{} doesn't exist", .0.display())]
    FileNotFound(PathBuf),
    /// The configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid INI.
    #[error("{} is invalid: {reason}", path.display())]
    InvalidFile { path: PathBuf, reason: String },
    /// The requested section is absent from the configuration file.
    #[error("missing [{0}] section")]
    MissingSection(String),
    /// A key in the collector section is not recognised.
    #[error("unknown key {key} in [{section}]")]
    UnknownKey { section: String, key: String },
    /// A value could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
