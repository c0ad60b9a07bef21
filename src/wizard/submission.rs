//! Payload Building
//!
//! Converts a draft into the job payload sent to the registry and into
//! the record kept in the local draft store, and back again on resume.

use chrono::Utc;
use log::{debug, warn};

use crate::draft::model::{config_blob, parse_config_blob, DestinationSettings, SourceSettings};
use crate::draft::{Draft, SavedDraft, StreamsSelection, WizardEntry, WizardStep};
use crate::services::{connector_id, ConnectorPayload, JobPayload};

/// Source connector in transport form.
pub fn source_payload(source: &SourceSettings) -> ConnectorPayload {
    ConnectorPayload {
        name: source.name.clone(),
        connector_type: connector_id(&source.connector_type),
        version: source.connector_version.clone(),
        config: config_blob(&source.form_data),
    }
}

/// Destination connector in transport form.
pub fn destination_payload(destination: &DestinationSettings) -> ConnectorPayload {
    ConnectorPayload {
        name: destination.name.clone(),
        connector_type: connector_id(&destination.connector_type),
        version: destination.connector_version.clone(),
        config: config_blob(&destination.form_data),
    }
}

/// Builds the final job definition.
///
/// The stream selection is normalized before serialization so the
/// registry never sees unchecked or repeated streams.
pub fn build_job_payload(draft: &Draft) -> Result<JobPayload, serde_json::Error> {
    let streams_config = draft.streams_selection.normalized().to_blob()?;

    let payload = JobPayload {
        name: draft.name.trim().to_string(),
        source: source_payload(&draft.source),
        destination: destination_payload(&draft.destination),
        streams_config,
        frequency: draft.schedule.clone(),
    };

    debug!(
        "Built job payload '{}' ({} -> {})",
        payload.name, payload.source.connector_type, payload.destination.connector_type
    );
    Ok(payload)
}

/// Builds the record persisted for an incomplete draft.
pub fn build_saved_draft(draft: &Draft, id: &str) -> Result<SavedDraft, serde_json::Error> {
    Ok(SavedDraft {
        id: id.to_string(),
        name: draft.name.clone(),
        source: source_payload(&draft.source),
        destination: destination_payload(&draft.destination),
        destination_catalog: draft.destination.catalog_type.clone(),
        streams_config: draft.streams_selection.to_blob()?,
        frequency: draft.schedule.clone(),
        saved_at: Some(Utc::now()),
    })
}

/// Rebuilds a draft from a saved record.
///
/// The result always starts at Config, however far the saving session
/// got. An unreadable stream selection is dropped rather than failing
/// the resume.
pub fn hydrate_draft(record: &SavedDraft) -> Draft {
    let streams_selection = match StreamsSelection::from_blob(&record.streams_config) {
        Ok(selection) => selection,
        Err(e) => {
            warn!(
                "Discarding unreadable stream selection in saved draft '{}': {}",
                record.id, e
            );
            StreamsSelection::default()
        }
    };

    Draft {
        step: WizardStep::Config,
        name: record.name.clone(),
        schedule: record.frequency.clone(),
        source: SourceSettings {
            name: record.source.name.clone(),
            connector_type: record.source.connector_type.clone(),
            connector_version: record.source.version.clone(),
            form_data: parse_config_blob(&record.source.config),
        },
        destination: DestinationSettings {
            name: record.destination.name.clone(),
            connector_type: record.destination.connector_type.clone(),
            connector_version: record.destination.version.clone(),
            form_data: parse_config_blob(&record.destination.config),
            catalog_type: record.destination_catalog.clone(),
        },
        streams_selection,
        name_locked: false,
    }
}

impl WizardEntry {
    /// Entry that continues a saved draft.
    pub fn resume(record: &SavedDraft) -> Self {
        Self {
            draft: Some(hydrate_draft(record)),
            saved_draft_id: Some(record.id.clone()),
            name_locked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::SelectedStream;
    use serde_json::{json, Value};

    fn sample_draft() -> Draft {
        let mut draft = Draft::new().with_name("  daily-sync ").with_schedule("0 * * * *");
        draft.source.name = "orders-db".to_string();
        draft.source.connector_type = "Postgres".to_string();
        draft.source.connector_version = "v0.1.0".to_string();
        draft.source.form_data = json!({"host": "db", "port": 5432});
        draft.destination.name = "lake".to_string();
        draft.destination.connector_type = "Apache Iceberg".to_string();
        draft.destination.form_data = json!(r#"{"bucket":"raw"}"#);
        draft.destination.catalog_type = Some("glue".to_string());
        draft.streams_selection = StreamsSelection::new()
            .with_stream("public", SelectedStream::new("orders"))
            .with_stream("public", SelectedStream::new("orders"))
            .with_stream("public", SelectedStream::new("audit").unchecked())
            .with_stream("public", SelectedStream::new("users").with_filter("id > 10"));
        draft
    }

    #[test]
    fn test_job_payload_normalizes_connectors() {
        let payload = build_job_payload(&sample_draft()).unwrap();

        assert_eq!(payload.name, "daily-sync");
        assert_eq!(payload.source.connector_type, "postgres");
        assert_eq!(payload.destination.connector_type, "iceberg");
        assert_eq!(payload.frequency, "0 * * * *");
    }

    #[test]
    fn test_job_payload_serializes_configs_once() {
        let payload = build_job_payload(&sample_draft()).unwrap();

        let source: Value = serde_json::from_str(&payload.source.config).unwrap();
        assert_eq!(source["port"], 5432);
        assert_eq!(payload.destination.config, r#"{"bucket":"raw"}"#);
    }

    #[test]
    fn test_job_payload_selected_streams_deduplicated() {
        let payload = build_job_payload(&sample_draft()).unwrap();
        let streams: Value = serde_json::from_str(&payload.streams_config).unwrap();

        let names: Vec<&str> = streams["selected_streams"]["public"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["stream_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["orders", "users"]);
    }

    #[test]
    fn test_saved_draft_roundtrip_resumes_at_config() {
        let mut draft = sample_draft();
        draft.step = WizardStep::Streams;
        draft.name_locked = true;

        let record = build_saved_draft(&draft, "abc").unwrap();
        let resumed = hydrate_draft(&record);

        assert_eq!(record.id, "abc");
        assert!(record.saved_at.is_some());
        assert_eq!(resumed.step, WizardStep::Config);
        assert_eq!(resumed.source.connector_type, "postgres");
        assert_eq!(resumed.source.form_data, json!({"host": "db", "port": 5432}));
        assert_eq!(resumed.destination.catalog_type.as_deref(), Some("glue"));
        // Saved selection keeps exactly what the panel had
        assert_eq!(resumed.streams_selection, draft.streams_selection);
    }

    #[test]
    fn test_resume_entry_keeps_record_id() {
        let record = build_saved_draft(&sample_draft(), "abc").unwrap();
        let entry = WizardEntry::resume(&record);

        assert_eq!(entry.saved_draft_id.as_deref(), Some("abc"));
        assert!(!entry.name_locked);
        assert_eq!(entry.draft.unwrap().name, "  daily-sync ");
    }

    #[test]
    fn test_hydrate_unreadable_streams() {
        let mut record = build_saved_draft(&sample_draft(), "abc").unwrap();
        record.streams_config = "[broken".to_string();

        let resumed = hydrate_draft(&record);
        assert!(resumed.streams_selection.is_empty());
    }
}
