//! Draft Data Model
//!
//! The in-memory job record assembled across wizard steps, and the
//! entry state the wizard is opened with.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::streams::StreamsSelection;

/// Default schedule for a fresh draft: every minute.
pub const DEFAULT_SCHEDULE: &str = "* * * * *";

/// Connector preselected on the source step.
pub const DEFAULT_SOURCE_CONNECTOR: &str = "MongoDB";

/// Connector preselected on the destination step.
pub const DEFAULT_DESTINATION_CONNECTOR: &str = "s3";

/// Wizard stage.
///
/// The forward path is Config → Source → Destination → Streams; advancing
/// from Streams submits the job instead of changing stage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Config,
    Source,
    Destination,
    Streams,
}

impl WizardStep {
    /// Next stage on the forward path, `None` from Streams.
    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Config => Some(WizardStep::Source),
            WizardStep::Source => Some(WizardStep::Destination),
            WizardStep::Destination => Some(WizardStep::Streams),
            WizardStep::Streams => None,
        }
    }

    /// Previous stage, `None` from Config.
    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Config => None,
            WizardStep::Source => Some(WizardStep::Config),
            WizardStep::Destination => Some(WizardStep::Source),
            WizardStep::Streams => Some(WizardStep::Destination),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Config => "config",
            WizardStep::Source => "source",
            WizardStep::Destination => "destination",
            WizardStep::Streams => "streams",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source connector settings as pushed up by the source panel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub name: String,
    pub connector_type: String,
    pub connector_version: String,
    /// Opaque panel form data
    #[serde(default)]
    pub form_data: Value,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            connector_type: DEFAULT_SOURCE_CONNECTOR.to_string(),
            connector_version: String::new(),
            form_data: Value::Object(Default::default()),
        }
    }
}

/// Destination connector settings as pushed up by the destination panel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DestinationSettings {
    pub name: String,
    pub connector_type: String,
    pub connector_version: String,
    #[serde(default)]
    pub form_data: Value,
    #[serde(default)]
    pub catalog_type: Option<String>,
}

impl Default for DestinationSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            connector_type: DEFAULT_DESTINATION_CONNECTOR.to_string(),
            connector_version: String::new(),
            form_data: Value::Object(Default::default()),
            catalog_type: None,
        }
    }
}

/// A single change event emitted by a connector panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorChange {
    Name(String),
    ConnectorType(String),
    Version(String),
    FormData(Value),
    /// Destination only
    CatalogType(Option<String>),
}

/// The job being assembled.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Draft {
    pub step: WizardStep,
    pub name: String,
    pub schedule: String,
    pub source: SourceSettings,
    pub destination: DestinationSettings,
    #[serde(default)]
    pub streams_selection: StreamsSelection,
    /// Set once Config has been passed; the name is frozen from then on
    #[serde(default)]
    pub name_locked: bool,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            step: WizardStep::Config,
            name: String::new(),
            schedule: DEFAULT_SCHEDULE.to_string(),
            source: SourceSettings::default(),
            destination: DestinationSettings::default(),
            streams_selection: StreamsSelection::default(),
            name_locked: false,
        }
    }
}

impl Draft {
    /// Creates an empty draft at the Config step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the job name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the cron schedule.
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    /// Applies a source panel change.
    pub fn apply_source_change(&mut self, change: ConnectorChange) {
        let source = &mut self.source;
        match change {
            ConnectorChange::Name(name) => source.name = name,
            ConnectorChange::ConnectorType(kind) => source.connector_type = kind,
            ConnectorChange::Version(version) => source.connector_version = version,
            ConnectorChange::FormData(data) => source.form_data = data,
            ConnectorChange::CatalogType(_) => {
                log::warn!("Ignoring catalog type change for source connector");
            }
        }
    }

    /// Applies a destination panel change.
    pub fn apply_destination_change(&mut self, change: ConnectorChange) {
        let destination = &mut self.destination;
        match change {
            ConnectorChange::Name(name) => destination.name = name,
            ConnectorChange::ConnectorType(kind) => destination.connector_type = kind,
            ConnectorChange::Version(version) => destination.connector_version = version,
            ConnectorChange::FormData(data) => destination.form_data = data,
            ConnectorChange::CatalogType(catalog) => destination.catalog_type = catalog,
        }
    }
}

/// Serialized form of panel form data.
///
/// Panels sometimes hand back data that is already serialized; that
/// string is passed through as-is instead of being quoted again.
pub fn config_blob(form_data: &Value) -> String {
    match form_data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses a stored config blob back into form data.
///
/// Blobs that are not valid JSON come back as a plain string value.
pub fn parse_config_blob(blob: &str) -> Value {
    serde_json::from_str(blob).unwrap_or_else(|_| Value::String(blob.to_string()))
}

/// State the wizard is entered with.
#[derive(Debug, Clone, Default)]
pub struct WizardEntry {
    /// Prior draft to continue from
    pub draft: Option<Draft>,
    /// Id of the saved record the draft came from
    pub saved_draft_id: Option<String>,
    /// Name already confirmed in an earlier session
    pub name_locked: bool,
}

impl WizardEntry {
    /// Entry for a brand-new job.
    pub fn fresh() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_draft_defaults() {
        let draft = Draft::new();
        assert_eq!(draft.step, WizardStep::Config);
        assert_eq!(draft.schedule, "* * * * *");
        assert_eq!(draft.source.connector_type, "MongoDB");
        assert_eq!(draft.destination.connector_type, "s3");
        assert!(draft.destination.catalog_type.is_none());
        assert!(!draft.name_locked);
    }

    #[test]
    fn test_step_forward_path() {
        assert_eq!(WizardStep::Config.next(), Some(WizardStep::Source));
        assert_eq!(WizardStep::Source.next(), Some(WizardStep::Destination));
        assert_eq!(WizardStep::Destination.next(), Some(WizardStep::Streams));
        assert_eq!(WizardStep::Streams.next(), None);
    }

    #[test]
    fn test_step_backward_path() {
        assert_eq!(WizardStep::Config.previous(), None);
        assert_eq!(WizardStep::Source.previous(), Some(WizardStep::Config));
        assert_eq!(WizardStep::Destination.previous(), Some(WizardStep::Source));
        assert_eq!(WizardStep::Streams.previous(), Some(WizardStep::Destination));
    }

    #[test]
    fn test_apply_changes() {
        let mut draft = Draft::new();
        draft.apply_source_change(ConnectorChange::Name("pg".into()));
        draft.apply_source_change(ConnectorChange::Version("v0.2.1".into()));
        draft.apply_source_change(ConnectorChange::CatalogType(Some("glue".into())));
        draft.apply_destination_change(ConnectorChange::CatalogType(Some("glue".into())));

        assert_eq!(draft.source.name, "pg");
        assert_eq!(draft.source.connector_version, "v0.2.1");
        assert_eq!(draft.destination.catalog_type.as_deref(), Some("glue"));
    }

    #[test]
    fn test_config_blob_passthrough() {
        assert_eq!(config_blob(&json!({"host": "db"})), r#"{"host":"db"}"#);
        assert_eq!(config_blob(&json!(r#"{"host":"db"}"#)), r#"{"host":"db"}"#);
    }

    #[test]
    fn test_parse_config_blob() {
        assert_eq!(parse_config_blob(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_config_blob("not json"), json!("not json"));
    }
}
