//! Jobflow - Job Creation Wizard
//!
//! The step-flow controller behind a four-step "create a data-sync job"
//! wizard: job configuration, source connector, destination connector
//! and stream selection. The controller owns the draft, gates each
//! forward move on validation, remote checks and connection tests, and
//! submits the finished job or keeps it as a local draft.
//!
//! # Architecture
//!
//! - [`wizard`]: Step controller, connection tests and payload building
//! - [`draft`]: Draft model, stream selection and saved-draft stores
//! - [`validation`]: Cron grammar and the per-step rules
//! - [`services`]: Contracts for the job registry and connection probe
//! - [`settings`]: Timings and defaults loaded from YAML
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use jobflow::draft::{JsonFileDraftStore, WizardEntry};
//! use jobflow::services::{ConnectionProbe, JobRegistry};
//! use jobflow::settings::WizardSettings;
//! use jobflow::wizard::{StepController, WizardServices};
//!
//! async fn create(
//!     registry: Arc<dyn JobRegistry>,
//!     probe: Arc<dyn ConnectionProbe>,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let services = WizardServices {
//!         registry,
//!         probe,
//!         store: Arc::new(JsonFileDraftStore::at_default_location()),
//!     };
//!     let (mut wizard, _events) =
//!         StepController::new(WizardEntry::fresh(), services, &WizardSettings::default());
//!
//!     wizard.set_job_name("daily-sync")?;
//!     wizard.next().await?; // Config -> Source
//!     Ok(())
//! }
//! ```

pub mod draft;
pub mod services;
pub mod settings;
pub mod validation;
pub mod wizard;

// Re-export commonly used types
pub use draft::{Draft, WizardEntry, WizardStep};
pub use settings::{load_settings, WizardSettings};
pub use validation::validate_cron;
pub use wizard::{StepController, Transition, WizardError, WizardEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Jobflow";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "Jobflow");
    }

    #[test]
    fn test_module_exports_draft() {
        let draft = Draft::new().with_name("daily-sync");
        assert_eq!(draft.step, WizardStep::Config);
        assert_eq!(draft.name, "daily-sync");
    }

    #[test]
    fn test_module_exports_cron() {
        assert!(validate_cron("*/15 * * * *").is_ok());
    }

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
        for part in parts {
            assert!(part.parse::<u32>().is_ok(), "Version components should be numeric");
        }
    }
}
