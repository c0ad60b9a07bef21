//! Presentation Events
//!
//! Everything the presentation layer shows (dialogs, toasts, the active
//! panel) is driven by these events instead of shared flags.

use std::fmt;

use log::debug;
use tokio::sync::mpsc::UnboundedSender;

use crate::draft::WizardStep;

/// Which connector a test or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorSide {
    Source,
    Destination,
}

impl fmt::Display for ConnectorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorSide::Source => f.write_str("Source"),
            ConnectorSide::Destination => f.write_str("Destination"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// Dialogs that need an explicit user decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Going back from Streams clears the selection
    ResetStreams,
    /// Cancelling from Source discards the job
    DiscardJob,
}

/// How the wizard session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Cancelled,
    Saved,
    Created,
}

/// Output of the step controller.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    StepChanged { from: WizardStep, to: WizardStep },
    TestingStarted(ConnectorSide),
    TestingFinished(ConnectorSide),
    TestSucceeded(ConnectorSide),
    TestFailed { side: ConnectorSide, message: String },
    ConfirmationRequested(Confirmation),
    Toast { level: ToastLevel, message: String },
    JobCreated { name: String },
    Exited(ExitReason),
}

impl WizardEvent {
    pub fn toast(level: ToastLevel, message: impl Into<String>) -> Self {
        WizardEvent::Toast {
            level,
            message: message.into(),
        }
    }
}

/// Sending half of the event stream.
///
/// Once the receiver is gone (the wizard view was closed) events are
/// dropped; in-flight work still runs to completion.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<WizardEvent>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<WizardEvent>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: WizardEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Dropping event, presentation detached: {:?}", e.0);
        }
    }
}
