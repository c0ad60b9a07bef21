//! Step Controller
//!
//! The state machine behind the job creation wizard. It owns the draft
//! for the whole session, gates forward moves on validation, remote
//! checks and connection tests, and reports everything the user should
//! see as [`WizardEvent`]s.
//!
//! # Transitions
//!
//! | From        | Next                                   | Back                       |
//! |-------------|----------------------------------------|----------------------------|
//! | Config      | name + cron + uniqueness → Source      | not offered                |
//! | Source      | panel check + probe → Destination      | Config                     |
//! | Destination | panel check + probe → Streams          | Source                     |
//! | Streams     | selection check → submit               | confirm reset → Destination|
//!
//! Operations take `&mut self`, so a second Next cannot start while a
//! connection test or submission is still awaited.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use uuid::Uuid;

use crate::draft::{
    ConnectorChange, Draft, DraftStore, StreamsSelection, WizardEntry, WizardStep,
};
use crate::services::{connector_id, ConnectionProbe, JobRegistry, ServiceError};
use crate::settings::WizardSettings;
use crate::validation::{
    panel_allows_advance, require_job_name, validate_cron, validate_streams, Validatable,
};

use super::connection::{ConnectionTarget, ConnectionTester, TestFailure, TestOutcome};
use super::error::WizardError;
use super::events::{
    Confirmation, ConnectorSide, EventSink, ExitReason, ToastLevel, WizardEvent,
};
use super::submission::{
    build_job_payload, build_saved_draft, destination_payload, source_payload,
};

/// Remote and local collaborators of a wizard session.
#[derive(Clone)]
pub struct WizardServices {
    pub registry: Arc<dyn JobRegistry>,
    pub probe: Arc<dyn ConnectionProbe>,
    pub store: Arc<dyn DraftStore>,
}

/// Result of a controller operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Moved { from: WizardStep, to: WizardStep },
    AwaitingConfirmation(Confirmation),
    /// A confirmation was declined
    Stayed,
    Submitted,
    Exited(ExitReason),
}

/// Drives one wizard session.
pub struct StepController {
    draft: Draft,
    saved_draft_id: Option<String>,
    registry: Arc<dyn JobRegistry>,
    store: Arc<dyn DraftStore>,
    tester: ConnectionTester,
    source_panel: Option<Box<dyn Validatable>>,
    destination_panel: Option<Box<dyn Validatable>>,
    streams_loading: bool,
    pending: Option<Confirmation>,
    last_failure: Option<TestFailure>,
    exit: Option<ExitReason>,
    sink: EventSink,
}

impl StepController {
    /// Opens a session and returns the event stream for the presentation layer.
    ///
    /// A carried-in draft always re-enters at Config.
    pub fn new(
        entry: WizardEntry,
        services: WizardServices,
        settings: &WizardSettings,
    ) -> (Self, UnboundedReceiver<WizardEvent>) {
        let (tx, rx) = unbounded_channel();

        let mut draft = entry.draft.unwrap_or_else(|| fresh_draft(settings));
        if draft.step != WizardStep::Config {
            debug!("Resuming draft from {} at the config step", draft.step);
            draft.step = WizardStep::Config;
        }
        draft.name_locked |= entry.name_locked;

        match &entry.saved_draft_id {
            Some(id) => info!("Resuming saved draft '{}'", id),
            None => info!("Starting new job draft"),
        }

        let controller = Self {
            draft,
            saved_draft_id: entry.saved_draft_id,
            registry: services.registry,
            store: services.store,
            tester: ConnectionTester::new(services.probe, settings),
            source_panel: None,
            destination_panel: None,
            streams_loading: false,
            pending: None,
            last_failure: None,
            exit: None,
            sink: EventSink::new(tx),
        };

        (controller, rx)
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.draft.step
    }

    pub fn saved_draft_id(&self) -> Option<&str> {
        self.saved_draft_id.as_deref()
    }

    pub fn pending_confirmation(&self) -> Option<Confirmation> {
        self.pending
    }

    /// Side and message of the last failed connection test.
    pub fn connection_failure(&self) -> Option<&TestFailure> {
        self.last_failure.as_ref()
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    /// Whether the Back action should be offered and enabled.
    pub fn back_available(&self) -> bool {
        match self.draft.step {
            WizardStep::Config => false,
            WizardStep::Streams => !self.streams_loading,
            _ => true,
        }
    }

    /// Label of the forward action.
    pub fn advance_label(&self) -> &'static str {
        match self.draft.step {
            WizardStep::Streams => "Create Job",
            _ => "Next",
        }
    }

    // Change callbacks

    pub fn set_job_name(&mut self, name: impl Into<String>) -> Result<(), WizardError> {
        let name = name.into();
        if self.draft.name_locked && name != self.draft.name {
            warn!("Ignoring edit of locked job name '{}'", self.draft.name);
            return Err(WizardError::NameLocked);
        }
        self.draft.name = name;
        Ok(())
    }

    pub fn set_schedule(&mut self, schedule: impl Into<String>) {
        self.draft.schedule = schedule.into();
    }

    pub fn apply_source_change(&mut self, change: ConnectorChange) {
        self.draft.apply_source_change(change);
    }

    pub fn apply_destination_change(&mut self, change: ConnectorChange) {
        self.draft.apply_destination_change(change);
    }

    pub fn set_streams_selection(&mut self, selection: StreamsSelection) {
        self.draft.streams_selection = selection;
    }

    /// Loading flag from the streams panel; Back is refused while set.
    pub fn set_streams_loading(&mut self, loading: bool) {
        self.streams_loading = loading;
    }

    /// Mounts the validation entry point of a connector panel.
    pub fn register_panel(&mut self, side: ConnectorSide, panel: Box<dyn Validatable>) {
        match side {
            ConnectorSide::Source => self.source_panel = Some(panel),
            ConnectorSide::Destination => self.destination_panel = Some(panel),
        }
    }

    pub fn unregister_panel(&mut self, side: ConnectorSide) {
        match side {
            ConnectorSide::Source => self.source_panel = None,
            ConnectorSide::Destination => self.destination_panel = None,
        }
    }

    /// Completion signal from a connector panel.
    ///
    /// Moves on only when the signal comes from the active step; anything
    /// else is logged and ignored.
    pub fn panel_completed(&mut self, step: WizardStep) -> Option<Transition> {
        if self.exit.is_some() || self.pending.is_some() {
            debug!("Ignoring completion of {} step", step);
            return None;
        }

        let current = self.draft.step;
        let from_panel = matches!(step, WizardStep::Source | WizardStep::Destination);

        match current.next() {
            Some(to) if from_panel && step == current => Some(self.move_to(to)),
            _ => {
                warn!(
                    "Ignoring completion signal from {} step while on {}",
                    step, current
                );
                None
            }
        }
    }

    // Actions

    /// The forward action of the active step.
    pub async fn next(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;

        match self.draft.step {
            WizardStep::Config => self.leave_config().await,
            WizardStep::Source => self.leave_source().await,
            WizardStep::Destination => self.leave_destination().await,
            WizardStep::Streams => self.submit().await,
        }
    }

    /// The backward action of the active step.
    pub fn back(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;

        match self.draft.step {
            WizardStep::Streams => {
                if self.streams_loading {
                    debug!("Back refused while streams are loading");
                    return Err(WizardError::StreamsLoading);
                }
                Ok(self.request_confirmation(Confirmation::ResetStreams))
            }
            current => match current.previous() {
                Some(to) => Ok(self.move_to(to)),
                None => Err(WizardError::BackUnavailable(current)),
            },
        }
    }

    /// Leaves the wizard; from Source this needs a confirmation first.
    pub fn cancel(&mut self) -> Result<Transition, WizardError> {
        self.ensure_active()?;

        if self.draft.step == WizardStep::Source {
            return Ok(self.request_confirmation(Confirmation::DiscardJob));
        }
        Ok(self.cancelled())
    }

    /// Resolves the pending confirmation dialog.
    pub fn confirm(&mut self, accepted: bool) -> Result<Transition, WizardError> {
        if self.exit.is_some() {
            return Err(WizardError::SessionEnded);
        }
        let pending = self.pending.take().ok_or(WizardError::NoPendingConfirmation)?;

        if !accepted {
            debug!("{:?} declined", pending);
            return Ok(Transition::Stayed);
        }

        match pending {
            Confirmation::ResetStreams => {
                info!("Resetting stream selection");
                self.draft.streams_selection = StreamsSelection::default();
                Ok(self.move_to(WizardStep::Destination))
            }
            Confirmation::DiscardJob => Ok(self.cancelled()),
        }
    }

    /// Persists the draft locally and leaves the wizard.
    ///
    /// Reuses the id of the record the session was resumed from, so
    /// repeated saves update one record. Returns that id.
    pub fn save_draft(&mut self) -> Result<String, WizardError> {
        self.ensure_active()?;

        let id = self
            .saved_draft_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let record = match build_saved_draft(&self.draft, &id) {
            Ok(record) => record,
            Err(e) => return self.reject(e.into()),
        };
        if let Err(e) = self.store.upsert(record) {
            error!("Failed to save draft '{}': {}", id, e);
            return self.reject(e.into());
        }

        self.saved_draft_id = Some(id.clone());
        self.sink
            .emit(WizardEvent::toast(ToastLevel::Success, "Job saved successfully!"));
        self.finish(ExitReason::Saved);
        Ok(id)
    }

    async fn leave_config(&mut self) -> Result<Transition, WizardError> {
        if !require_job_name(&self.draft.name) {
            return self.reject(WizardError::JobNameRequired);
        }
        if let Err(e) = validate_cron(&self.draft.schedule) {
            return self.reject(e.into());
        }

        if !self.draft.name_locked {
            let name = self.draft.name.trim().to_string();
            match self.registry.check_name_unique(&name).await {
                Ok(true) => {}
                Ok(false) => return self.reject(WizardError::NameTaken),
                Err(e) => {
                    error!("Name uniqueness check for '{}' failed: {}", name, e);
                    return self.reject(WizardError::NameCheckFailed(e.to_string()));
                }
            }

            self.draft.name_locked = true;
            info!("Job name '{}' confirmed", name);
        }

        Ok(self.move_to(WizardStep::Source))
    }

    async fn leave_source(&mut self) -> Result<Transition, WizardError> {
        let source = &self.draft.source;
        let panel = self.source_panel.as_deref();
        let has_panel = panel.is_some();

        if !panel_allows_advance(panel, &source.name, &source.connector_version) {
            return self.reject(WizardError::PanelInvalid {
                side: ConnectorSide::Source,
                has_panel,
            });
        }

        let payload = source_payload(source);
        self.run_connection_test(ConnectionTarget::Source(&payload), WizardStep::Destination)
            .await
    }

    async fn leave_destination(&mut self) -> Result<Transition, WizardError> {
        let destination = &self.draft.destination;
        let panel = self.destination_panel.as_deref();
        let has_panel = panel.is_some();

        if !panel_allows_advance(panel, &destination.name, &destination.connector_version) {
            return self.reject(WizardError::PanelInvalid {
                side: ConnectorSide::Destination,
                has_panel,
            });
        }

        let payload = destination_payload(destination);
        let source_type = connector_id(&self.draft.source.connector_type);
        let source_version = self.draft.source.connector_version.clone();

        let target = ConnectionTarget::Destination {
            destination: &payload,
            source_type: &source_type,
            source_version: &source_version,
        };
        self.run_connection_test(target, WizardStep::Streams).await
    }

    async fn run_connection_test(
        &mut self,
        target: ConnectionTarget<'_>,
        on_success: WizardStep,
    ) -> Result<Transition, WizardError> {
        self.last_failure = None;

        match self.tester.run(target, &self.sink).await {
            TestOutcome::Passed => Ok(self.move_to(on_success)),
            TestOutcome::Failed(failure) => {
                let err = WizardError::ConnectionFailed {
                    side: failure.side,
                    message: failure.message.clone(),
                };
                self.last_failure = Some(failure);
                Err(err)
            }
        }
    }

    async fn submit(&mut self) -> Result<Transition, WizardError> {
        if let Err(e) = validate_streams(&self.draft.streams_selection) {
            return self.reject(e.into());
        }

        let payload = match build_job_payload(&self.draft) {
            Ok(payload) => payload,
            Err(e) => return self.reject(e.into()),
        };

        info!("Creating job '{}'", payload.name);

        // Runs detached: once sent, creation and draft cleanup finish even
        // if this future is dropped.
        let registry = Arc::clone(&self.registry);
        let store = Arc::clone(&self.store);
        let saved_draft_id = self.saved_draft_id.clone();
        let job = payload.clone();
        let commit = tokio::spawn(async move {
            registry.create_job(&job).await?;
            if let Some(id) = saved_draft_id {
                remove_saved_draft(store.as_ref(), &id);
            }
            Ok::<(), ServiceError>(())
        });

        let result = commit.await.unwrap_or_else(|e| {
            Err(ServiceError::Transport(format!("submission task failed: {}", e)))
        });
        if let Err(e) = result {
            error!("Error adding job '{}': {}", payload.name, e);
            return self.reject(WizardError::SubmissionFailed(e.to_string()));
        }

        self.sink.emit(WizardEvent::JobCreated { name: payload.name });
        self.finish(ExitReason::Created);
        Ok(Transition::Submitted)
    }

    fn ensure_active(&self) -> Result<(), WizardError> {
        if self.exit.is_some() {
            return Err(WizardError::SessionEnded);
        }
        if self.pending.is_some() {
            return Err(WizardError::ConfirmationPending);
        }
        Ok(())
    }

    fn move_to(&mut self, to: WizardStep) -> Transition {
        let from = self.draft.step;
        self.draft.step = to;

        info!("Step {} -> {}", from, to);
        self.sink.emit(WizardEvent::StepChanged { from, to });
        Transition::Moved { from, to }
    }

    fn request_confirmation(&mut self, confirmation: Confirmation) -> Transition {
        self.pending = Some(confirmation);
        self.sink.emit(WizardEvent::ConfirmationRequested(confirmation));
        Transition::AwaitingConfirmation(confirmation)
    }

    fn cancelled(&mut self) -> Transition {
        self.sink
            .emit(WizardEvent::toast(ToastLevel::Info, "Job creation cancelled"));
        self.finish(ExitReason::Cancelled);
        Transition::Exited(ExitReason::Cancelled)
    }

    fn finish(&mut self, reason: ExitReason) {
        info!("Wizard finished: {:?}", reason);
        self.exit = Some(reason);
        self.sink.emit(WizardEvent::Exited(reason));
    }

    fn reject<T>(&self, err: WizardError) -> Result<T, WizardError> {
        warn!("{} step blocked: {}", self.draft.step, err);
        self.sink
            .emit(WizardEvent::toast(ToastLevel::Error, err.to_string()));
        Err(err)
    }
}

fn remove_saved_draft(store: &dyn DraftStore, id: &str) {
    match store.delete(id) {
        Ok(true) => info!("Removed saved draft '{}'", id),
        Ok(false) => debug!("Saved draft '{}' already gone", id),
        Err(e) => warn!("Job created but saved draft '{}' was not removed: {}", id, e),
    }
}

fn fresh_draft(settings: &WizardSettings) -> Draft {
    let mut draft = Draft::new().with_schedule(settings.default_schedule.clone());
    draft.source.connector_type = settings.default_source_connector.clone();
    draft.destination.connector_type = settings.default_destination_connector.clone();
    draft
}
