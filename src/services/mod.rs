//! Remote Service Contracts
//!
//! The three suspension points of the wizard: the name-uniqueness check,
//! the connection probe and job creation. Implementations live outside
//! this crate; the controller only depends on these traits.
//!
//! - [`payload`]: Wire shapes and connector normalization

pub mod payload;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use payload::{connector_id, ConnectorPayload, JobPayload};

/// Failures talking to a remote service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with an error
    #[error("{0}")]
    Rejected(String),
}

/// Outcome status reported by a connection probe.
///
/// Anything other than `SUCCEEDED` counts as failure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ConnectionStatus {
    Succeeded,
    Other(String),
}

impl ConnectionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ConnectionStatus::Succeeded)
    }
}

impl From<String> for ConnectionStatus {
    fn from(raw: String) -> Self {
        if raw == "SUCCEEDED" {
            ConnectionStatus::Succeeded
        } else {
            ConnectionStatus::Other(raw)
        }
    }
}

impl From<ConnectionStatus> for String {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Succeeded => "SUCCEEDED".to_string(),
            ConnectionStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Succeeded => f.write_str("SUCCEEDED"),
            ConnectionStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Response of a connection probe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub status: ConnectionStatus,
    #[serde(default)]
    pub message: Option<String>,
}

impl ProbeResult {
    pub fn succeeded() -> Self {
        Self {
            status: ConnectionStatus::Succeeded,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Other("FAILED".to_string()),
            message: Some(message.into()),
        }
    }
}

/// Remote job registry.
#[async_trait]
pub trait JobRegistry: Send + Sync {
    /// Returns true when no existing job uses `name`.
    async fn check_name_unique(&self, name: &str) -> Result<bool, ServiceError>;

    /// Commits a job definition.
    async fn create_job(&self, payload: &JobPayload) -> Result<(), ServiceError>;
}

/// Probe that exercises connector credentials.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn test_source(&self, source: &ConnectorPayload) -> Result<ProbeResult, ServiceError>;

    /// The confirmed source type and version are passed as context.
    async fn test_destination(
        &self,
        destination: &ConnectorPayload,
        source_type: &str,
        source_version: &str,
    ) -> Result<ProbeResult, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_wire() {
        let result: ProbeResult =
            serde_json::from_str(r#"{"status":"FAILED","message":"auth error"}"#).unwrap();
        assert!(!result.status.is_success());
        assert_eq!(result.message.as_deref(), Some("auth error"));

        let ok: ProbeResult = serde_json::from_str(r#"{"status":"SUCCEEDED"}"#).unwrap();
        assert!(ok.status.is_success());
        assert!(ok.message.is_none());
    }

    #[test]
    fn test_status_is_case_sensitive() {
        assert!(!ConnectionStatus::from("succeeded".to_string()).is_success());
    }

    #[test]
    fn test_status_to_wire() {
        let json = serde_json::to_string(&ProbeResult::succeeded()).unwrap();
        assert!(json.contains("\"SUCCEEDED\""));
    }
}
