//! Step Gate Rules
//!
//! Predicates the controller runs before leaving a step.

use log::debug;
use thiserror::Error;

use crate::draft::streams::{StreamId, StreamsSelection};

/// Capability implemented by connector configuration panels.
///
/// The controller treats the result as authoritative and never looks
/// at concrete panel types.
pub trait Validatable: Send + Sync {
    /// Runs the panel's own field validation.
    fn validate(&self) -> bool;
}

impl<F> Validatable for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn validate(&self) -> bool {
        self()
    }
}

/// Rejected stream selections.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StreamSelectionError {
    #[error("Filter Value cannot be empty: no streams selected")]
    NothingSelected,

    #[error("Filter Value cannot be empty for stream '{0}'")]
    EmptyFilter(StreamId),
}

/// Returns true if the job name has content after trimming.
pub fn require_job_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Checks a selection is submittable.
///
/// At least one stream must be checked, and no checked entry may carry
/// a filter field that is present but blank. Repeated entries are checked
/// too, even though submission keeps only the first.
pub fn validate_streams(selection: &StreamsSelection) -> Result<(), StreamSelectionError> {
    if selection.normalized().is_empty() {
        return Err(StreamSelectionError::NothingSelected);
    }

    for (namespace, stream) in selection.checked() {
        if stream.has_blank_filter() {
            return Err(StreamSelectionError::EmptyFilter(StreamId {
                namespace: namespace.to_string(),
                stream_name: stream.stream_name.clone(),
            }));
        }
    }

    Ok(())
}

/// Decides whether a connector step may run its connection test.
///
/// A registered panel decides on its own. Without one, only a blank
/// name next to a filled-in version is rejected; a panel that was never
/// touched (blank name and version) passes.
pub fn panel_allows_advance(panel: Option<&dyn Validatable>, name: &str, version: &str) -> bool {
    match panel {
        Some(panel) => panel.validate(),
        None => {
            let untouched = version.trim().is_empty();
            if untouched && name.trim().is_empty() {
                debug!("Connector panel untouched, skipping field validation");
            }
            require_job_name(name) || untouched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::streams::SelectedStream;

    #[test]
    fn test_require_job_name() {
        assert!(require_job_name("daily-sync"));
        assert!(!require_job_name(""));
        assert!(!require_job_name("   \t"));
    }

    #[test]
    fn test_streams_empty_selection() {
        assert_eq!(
            validate_streams(&StreamsSelection::new()),
            Err(StreamSelectionError::NothingSelected)
        );
    }

    #[test]
    fn test_streams_only_unchecked() {
        let selection =
            StreamsSelection::new().with_stream("shop", SelectedStream::new("orders").unchecked());
        assert_eq!(
            validate_streams(&selection),
            Err(StreamSelectionError::NothingSelected)
        );
    }

    #[test]
    fn test_streams_blank_filter() {
        let selection = StreamsSelection::new()
            .with_stream("shop", SelectedStream::new("orders"))
            .with_stream("shop", SelectedStream::new("refunds").with_filter(" "));

        let err = validate_streams(&selection).unwrap_err();
        assert!(err.to_string().contains("shop.refunds"));
        assert!(err.to_string().starts_with("Filter Value cannot be empty"));
    }

    #[test]
    fn test_streams_blank_filter_on_repeated_entry() {
        let selection = StreamsSelection::new()
            .with_stream("shop", SelectedStream::new("orders"))
            .with_stream("shop", SelectedStream::new("orders").with_filter(" "));

        assert_eq!(
            validate_streams(&selection),
            Err(StreamSelectionError::EmptyFilter(StreamId {
                namespace: "shop".to_string(),
                stream_name: "orders".to_string(),
            }))
        );
    }

    #[test]
    fn test_streams_blank_filter_on_unchecked_ignored() {
        let selection = StreamsSelection::new()
            .with_stream("shop", SelectedStream::new("orders"))
            .with_stream("shop", SelectedStream::new("refunds").with_filter("").unchecked());

        assert!(validate_streams(&selection).is_ok());
    }

    #[test]
    fn test_panel_is_authoritative() {
        let reject = || false;
        let accept = || true;
        assert!(!panel_allows_advance(Some(&reject), "named", "v1"));
        assert!(panel_allows_advance(Some(&accept), "", "v1"));
    }

    #[test]
    fn test_panel_fallback() {
        assert!(panel_allows_advance(None, "", ""));
        assert!(panel_allows_advance(None, "pg", "v1"));
        assert!(panel_allows_advance(None, "pg", ""));
        assert!(!panel_allows_advance(None, " ", "v1"));
    }
}
