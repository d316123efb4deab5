//! Formatting of log entries into newline-delimited JSON documents.
//!
//! [`format_entry`] renders the document shape the collector ingests:
//! `@timestamp`, `level` and `message` first, then the optional metadata,
//! identifiers and exception, and finally the caller's properties. Properties
//! never replace a field the entry itself defines.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::log_entry::LogEntry;

/// Keys owned by the document itself; properties using them are dropped.
pub const RESERVED_KEYS: [&str; 5] = [
    "@timestamp",
    "level",
    "message",
    "application",
    "environment",
];

/// Trait for turning log entries into single-line payloads.
///
/// Implementors must be thread-safe (`Send + Sync`) because one writer is
/// shared by every thread that logs through it.
pub trait LogFormatter: Send + Sync {
    /// Format an entry into one line of output, without a terminator.
    fn format(&self, entry: &LogEntry) -> String;
}

/// Default formatter producing Logstash-style JSON.
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonFormatter;

impl LogFormatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        format_entry(entry)
    }
}

impl LogFormatter for Arc<dyn LogFormatter> {
    fn format(&self, entry: &LogEntry) -> String {
        (**self).format(entry)
    }
}

impl LogFormatter for Box<dyn LogFormatter> {
    fn format(&self, entry: &LogEntry) -> String {
        (**self).format(entry)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the ordered JSON object for `entry`.
pub fn entry_document(entry: &LogEntry) -> Map<String, Value> {
    let mut doc = Map::new();
    let timestamp = entry
        .timestamp()
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    doc.insert("@timestamp".into(), Value::String(timestamp));
    doc.insert("level".into(), Value::String(entry.level().as_str().into()));
    doc.insert("message".into(), Value::String(entry.message().into()));

    if let Some(application) = entry.application() {
        doc.insert("application".into(), Value::String(application.into()));
    }
    if let Some(environment) = entry.environment() {
        doc.insert("environment".into(), Value::String(environment.into()));
    }
    if let Some(correlation_id) = non_blank(entry.correlation_id()) {
        doc.insert("correlationId".into(), Value::String(correlation_id.into()));
    }
    if let Some(user_id) = non_blank(entry.user_id()) {
        doc.insert("userId".into(), Value::String(user_id.into()));
    }
    if let Some(exception) = entry.exception() {
        let value = serde_json::to_value(exception)
            .unwrap_or_else(|_| Value::String(exception.to_string()));
        doc.insert("exception".into(), value);
    }

    for (key, value) in entry.properties() {
        if RESERVED_KEYS.contains(&key.as_str()) || doc.contains_key(key) {
            continue;
        }
        doc.insert(key.clone(), value.clone());
    }
    doc
}

/// Render `entry` as compact single-line JSON.
pub fn format_entry(entry: &LogEntry) -> String {
    // `Value`'s `Display` is the compact encoder; control characters are
    // always escaped so the result never spans lines.
    Value::Object(entry_document(entry)).to_string()
}
