//! Wizard Settings
//!
//! Presentation timings, defaults for fresh drafts and the saved-draft
//! location, loadable from YAML.
//!
//! # Example YAML Format
//!
//! ```yaml
//! testing_min_display_ms: 1500
//! success_hold_ms: 1000
//! default_source_connector: Postgres
//! drafts_path: /var/lib/jobflow/saved_jobs.json
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::draft::model::{
    DEFAULT_DESTINATION_CONNECTOR, DEFAULT_SCHEDULE, DEFAULT_SOURCE_CONNECTOR,
};

/// Tunables for a wizard session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WizardSettings {
    /// Minimum time the "testing" presentation stays up
    pub testing_min_display_ms: u64,

    /// How long the "success" presentation is held before moving on
    pub success_hold_ms: u64,

    pub default_source_connector: String,
    pub default_destination_connector: String,
    pub default_schedule: String,

    /// Saved-draft file; the store default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drafts_path: Option<PathBuf>,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            testing_min_display_ms: 1500,
            success_hold_ms: 1000,
            default_source_connector: DEFAULT_SOURCE_CONNECTOR.to_string(),
            default_destination_connector: DEFAULT_DESTINATION_CONNECTOR.to_string(),
            default_schedule: DEFAULT_SCHEDULE.to_string(),
            drafts_path: None,
        }
    }
}

impl WizardSettings {
    /// Settings with no presentation delays.
    pub fn immediate() -> Self {
        Self {
            testing_min_display_ms: 0,
            success_hold_ms: 0,
            ..Self::default()
        }
    }

    pub fn testing_min_display(&self) -> Duration {
        Duration::from_millis(self.testing_min_display_ms)
    }

    pub fn success_hold(&self) -> Duration {
        Duration::from_millis(self.success_hold_ms)
    }
}

/// Loads settings from a YAML file.
///
/// Missing keys take their default values.
pub fn load_settings(path: &str) -> Result<WizardSettings, Box<dyn Error>> {
    info!("Loading settings from: {}", path);

    let yaml_content = fs::read_to_string(path).map_err(|e| {
        format!(
            "Failed to read settings file '{}': {}. Check that the file exists and is readable.",
            path, e
        )
    })?;

    debug!("Settings content loaded ({} bytes)", yaml_content.len());

    let settings = parse_settings(&yaml_content)?;
    Ok(settings)
}

/// Parses settings from YAML text.
pub fn parse_settings(yaml: &str) -> Result<WizardSettings, Box<dyn Error>> {
    if yaml.trim().is_empty() {
        return Ok(WizardSettings::default());
    }

    let settings: WizardSettings = serde_yaml::from_str(yaml)
        .map_err(|e| format!("Failed to parse settings YAML: {}. Check the file format.", e))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = WizardSettings::default();
        assert_eq!(settings.testing_min_display(), Duration::from_millis(1500));
        assert_eq!(settings.success_hold(), Duration::from_millis(1000));
        assert_eq!(settings.default_schedule, "* * * * *");
        assert!(settings.drafts_path.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = parse_settings("success_hold_ms: 250\n").unwrap();
        assert_eq!(settings.success_hold_ms, 250);
        assert_eq!(settings.testing_min_display_ms, 1500);
        assert_eq!(settings.default_source_connector, "MongoDB");
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(parse_settings("").unwrap(), WizardSettings::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse_settings("success_hold_ms: [not, a, number]");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse settings YAML"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("jobflow.yaml");
        fs::write(&path, "drafts_path: /tmp/drafts.json\ndefault_schedule: '0 * * * *'\n").unwrap();

        let settings = load_settings(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.drafts_path, Some(PathBuf::from("/tmp/drafts.json")));
        assert_eq!(settings.default_schedule, "0 * * * *");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_settings("/nonexistent/jobflow.yaml").is_err());
    }
}
