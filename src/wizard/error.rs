//! Wizard errors.
//!
//! Every variant leaves the draft and the active step as they were, so
//! the user can correct the input and try again.

use thiserror::Error;

use crate::draft::{StoreError, WizardStep};
use crate::validation::{CronError, StreamSelectionError};

use super::events::ConnectorSide;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Job name is required")]
    JobNameRequired,

    #[error(transparent)]
    InvalidSchedule(#[from] CronError),

    #[error("Job name already exists. Please choose a different name.")]
    NameTaken,

    #[error("Failed to check job name uniqueness. Please try again.")]
    NameCheckFailed(String),

    #[error("Job name cannot be changed once confirmed")]
    NameLocked,

    #[error("{}", panel_message(.side, .has_panel))]
    PanelInvalid { side: ConnectorSide, has_panel: bool },

    #[error("{side} connection test failed: {message}")]
    ConnectionFailed { side: ConnectorSide, message: String },

    #[error(transparent)]
    InvalidStreams(#[from] StreamSelectionError),

    #[error("Failed to create job: {0}")]
    SubmissionFailed(String),

    #[error("Failed to build job payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Failed to save job: {0}")]
    Store(#[from] StoreError),

    #[error("Back is not available from the {0} step")]
    BackUnavailable(WizardStep),

    #[error("Streams are still loading")]
    StreamsLoading,

    #[error("Waiting for a confirmation")]
    ConfirmationPending,

    #[error("Nothing to confirm")]
    NoPendingConfirmation,

    #[error("The wizard session has ended")]
    SessionEnded,
}

fn panel_message(side: &ConnectorSide, has_panel: &bool) -> String {
    let noun = match side {
        ConnectorSide::Source => "source",
        ConnectorSide::Destination => "destination",
    };
    if *has_panel {
        format!("Please fill in all required fields for the {}", noun)
    } else {
        format!("{} name is required", side)
    }
}
