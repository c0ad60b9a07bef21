//! Transport Payloads
//!
//! Wire shapes sent to the job registry and the connection probe.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Display names whose canonical identifier is not a plain lower-casing.
static CONNECTOR_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("amazon s3", "s3"),
        ("aws s3", "s3"),
        ("apache iceberg", "iceberg"),
        ("postgresql", "postgres"),
    ])
});

/// Canonical lower-case connector identifier.
///
/// # Example
///
/// ```
/// use jobflow::services::connector_id;
///
/// assert_eq!(connector_id("MongoDB"), "mongodb");
/// assert_eq!(connector_id("Amazon S3"), "s3");
/// ```
pub fn connector_id(display: &str) -> String {
    let lower = display.trim().to_lowercase();
    match CONNECTOR_ALIASES.get(lower.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => lower,
    }
}

/// A connector as sent over the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectorPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub connector_type: String,
    pub version: String,
    /// Serialized form data
    pub config: String,
}

/// Final job definition committed to the registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobPayload {
    pub name: String,
    pub source: ConnectorPayload,
    pub destination: ConnectorPayload,
    /// Serialized, normalized stream selection
    pub streams_config: String,
    /// Cron schedule
    pub frequency: String,
}
