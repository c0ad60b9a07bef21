//! Connection Testing
//!
//! Runs a connector probe and plays the presentation sequence around it:
//!
//! 1. `TestingStarted`
//! 2. await the probe
//! 3. `TestingFinished`, no earlier than the minimum display time
//! 4. on success `TestSucceeded`, held for a moment before the caller
//!    moves on
//! 5. on failure `TestFailed` with the server message
//!
//! A transport error skips the minimum display and is reported as a
//! toast instead of the failure dialog. The probe call itself runs as a
//! spawned task, so it completes even when the caller stops waiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::services::{ConnectionProbe, ConnectorPayload, ProbeResult, ServiceError};
use crate::settings::WizardSettings;

use super::events::{ConnectorSide, EventSink, ToastLevel, WizardEvent};

/// What to probe.
#[derive(Debug, Clone, Copy)]
pub enum ConnectionTarget<'a> {
    Source(&'a ConnectorPayload),
    Destination {
        destination: &'a ConnectorPayload,
        source_type: &'a str,
        source_version: &'a str,
    },
}

impl ConnectionTarget<'_> {
    pub fn side(&self) -> ConnectorSide {
        match self {
            ConnectionTarget::Source(_) => ConnectorSide::Source,
            ConnectionTarget::Destination { .. } => ConnectorSide::Destination,
        }
    }
}

/// A failed test, attributed to the side that was probed.
#[derive(Debug, Clone, PartialEq)]
pub struct TestFailure {
    pub side: ConnectorSide,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    Passed,
    Failed(TestFailure),
}

/// Probe runner with presentation timing.
#[derive(Clone)]
pub struct ConnectionTester {
    probe: Arc<dyn ConnectionProbe>,
    min_display: Duration,
    success_hold: Duration,
}

impl ConnectionTester {
    pub fn new(probe: Arc<dyn ConnectionProbe>, settings: &WizardSettings) -> Self {
        Self {
            probe,
            min_display: settings.testing_min_display(),
            success_hold: settings.success_hold(),
        }
    }

    /// Probes the target and emits the presentation sequence.
    pub async fn run(&self, target: ConnectionTarget<'_>, sink: &EventSink) -> TestOutcome {
        let side = target.side();
        let started = Instant::now();

        info!("Testing {} connection", side);
        sink.emit(WizardEvent::TestingStarted(side));

        let probe_result = match self.probe_detached(target).await {
            Ok(probe_result) => probe_result,
            Err(e) => {
                error!("{} connection test failed: {}", side, e);
                sink.emit(WizardEvent::TestingFinished(side));
                sink.emit(WizardEvent::toast(
                    ToastLevel::Error,
                    format!("{} connection test failed", side),
                ));
                return TestOutcome::Failed(TestFailure {
                    side,
                    message: e.to_string(),
                });
            }
        };

        let remaining = self.min_display.saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
        sink.emit(WizardEvent::TestingFinished(side));

        if probe_result.status.is_success() {
            debug!("{} connection test succeeded", side);
            sink.emit(WizardEvent::TestSucceeded(side));
            if !self.success_hold.is_zero() {
                tokio::time::sleep(self.success_hold).await;
            }
            return TestOutcome::Passed;
        }

        let message = probe_result.message.unwrap_or_default();
        warn!(
            "{} connection test returned {}: {}",
            side, probe_result.status, message
        );
        sink.emit(WizardEvent::TestFailed {
            side,
            message: message.clone(),
        });

        TestOutcome::Failed(TestFailure { side, message })
    }

    async fn probe_detached(
        &self,
        target: ConnectionTarget<'_>,
    ) -> Result<ProbeResult, ServiceError> {
        let probe = Arc::clone(&self.probe);

        let call = match target {
            ConnectionTarget::Source(source) => {
                let source = source.clone();
                tokio::spawn(async move { probe.test_source(&source).await })
            }
            ConnectionTarget::Destination {
                destination,
                source_type,
                source_version,
            } => {
                let destination = destination.clone();
                let source_type = source_type.to_string();
                let source_version = source_version.to_string();
                tokio::spawn(async move {
                    probe
                        .test_destination(&destination, &source_type, &source_version)
                        .await
                })
            }
        };

        call.await
            .unwrap_or_else(|e| Err(ServiceError::Transport(format!("probe task failed: {}", e))))
    }
}
