//! Log entry representation shipped by the writer.
//!
//! A [`LogEntry`] captures one log event together with the optional
//! application metadata, identifiers, structured properties and error details
//! that the collector indexes. Entries are assembled with the consuming
//! `with_*` methods and only read afterwards.

use std::error::Error as StdError;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::level::LogLevel;

/// Structured description of an error attached to a log entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionInfo {
    /// Fully qualified type name of the error.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Human readable error message.
    pub message: String,
    /// Stack or cause chain rendered as text.
    pub stack_trace: Option<String>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: None,
        }
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Capture an error value, rendering its `source()` chain as the trace.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self {
            type_name: std::any::type_name::<E>().to_owned(),
            message: err.to_string(),
            stack_trace: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

/// One log event destined for the collector.
#[derive(Clone, Debug)]
pub struct LogEntry {
    timestamp: DateTime<FixedOffset>,
    level: LogLevel,
    message: String,
    application: Option<String>,
    environment: Option<String>,
    correlation_id: Option<String>,
    user_id: Option<String>,
    properties: Map<String, Value>,
    exception: Option<ExceptionInfo>,
}

impl LogEntry {
    /// Construct an entry stamped with the current time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self::at(Utc::now().fixed_offset(), level, message)
    }

    /// Construct an entry with an explicit timestamp.
    pub fn at(
        timestamp: DateTime<FixedOffset>,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
            application: None,
            environment: None,
            correlation_id: None,
            user_id: None,
            properties: Map::new(),
            exception: None,
        }
    }

    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Attach a structured property.
    ///
    /// Values that cannot be represented as JSON are stored as their `Debug`
    /// rendering instead. Setting the same key twice keeps the original
    /// position and replaces the value.
    pub fn with_property<V>(mut self, key: impl Into<String>, value: V) -> Self
    where
        V: Serialize + fmt::Debug,
    {
        let value = serde_json::to_value(&value)
            .unwrap_or_else(|_| Value::String(format!("{value:?}")));
        self.properties.insert(key.into(), value);
        self
    }

    /// Attach several properties at once, preserving iteration order.
    pub fn with_properties<I, K>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in properties {
            self.properties.insert(key.into(), value);
        }
        self
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn application(&self) -> Option<&str> {
        self.application.as_deref()
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
