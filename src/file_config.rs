//! INI loading for [`ConnectionConfig`].
//!
//! Deployments usually keep collector settings beside the application rather
//! than in code. The file holds a single `[collector]` section:
//!
//! ```ini
//! [collector]
//! host = logs.internal
//! port = 5000
//! use_tls = true
//! ca_certificate_path = /etc/logship/ca.crt
//! accept_any_certificate = false
//! connect_timeout_ms = 5000
//! write_timeout_ms = 5000
//! ```
//!
//! Every key is optional and falls back to [`ConnectionConfig::default`].

use std::{fs, io::ErrorKind, path::Path, time::Duration};

use ini::Ini;

use crate::{config::ConfigError, connection::ConnectionConfig};

/// Section consulted by [`load_connection_config`].
pub const COLLECTOR_SECTION: &str = "collector";

/// Read and parse `path` into a connection configuration.
pub fn load_connection_config(path: impl AsRef<Path>) -> Result<ConnectionConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::FileUnreadable {
            path: path.to_path_buf(),
            source: err,
        },
    })?;
    let ini = Ini::load_from_str(&text).map_err(|err| ConfigError::InvalidFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    connection_config_from_ini(&ini)
}

/// Parse INI text into a connection configuration.
pub fn parse_connection_config(text: &str) -> Result<ConnectionConfig, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::InvalidFile {
        path: "<string>".into(),
        reason: err.to_string(),
    })?;
    connection_config_from_ini(&ini)
}

fn connection_config_from_ini(ini: &Ini) -> Result<ConnectionConfig, ConfigError> {
    let section = ini
        .section(Some(COLLECTOR_SECTION))
        .ok_or_else(|| ConfigError::MissingSection(COLLECTOR_SECTION.into()))?;
    let mut config = ConnectionConfig::default();
    for (key, raw) in section.iter() {
        let value = raw.trim();
        match key {
            "host" => config.host = parse_host(key, value)?,
            "port" => config.port = parse_number(key, value)?,
            "use_tls" => config.use_tls = parse_bool(key, value)?,
            "ca_certificate_path" => {
                config.ca_certificate_path = (!value.is_empty()).then(|| value.into());
            }
            "accept_any_certificate" => config.accept_any_certificate = parse_bool(key, value)?,
            "connect_timeout_ms" => config.connect_timeout = parse_timeout(key, value)?,
            "write_timeout_ms" => config.write_timeout = parse_timeout(key, value)?,
            _ => {
                return Err(ConfigError::UnknownKey {
                    section: COLLECTOR_SECTION.into(),
                    key: key.to_owned(),
                });
            }
        }
    }
    Ok(config)
}

fn invalid(key: &str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}

fn parse_host(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(invalid(key, value, "host must not be empty"));
    }
    Ok(value.to_owned())
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err| invalid(key, value, err))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(key, value, "expected a boolean")),
    }
}

fn parse_timeout(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let millis: u64 = parse_number(key, value)?;
    if millis == 0 {
        return Err(invalid(key, value, "timeout must be positive"));
    }
    Ok(Duration::from_millis(millis))
}
