//! Wizard Module
//!
//! The step-flow controller for creating a job, plus the pieces it is
//! built from.
//!
//! # Architecture
//!
//! - [`controller`]: Step state machine and session lifecycle
//! - [`connection`]: Connection probe runner with presentation timing
//! - [`submission`]: Draft to payload and saved-record conversion
//! - [`events`]: Events consumed by the presentation layer
//! - [`error`]: Reasons an operation was refused

pub mod connection;
pub mod controller;
pub mod error;
pub mod events;
pub mod submission;

pub use connection::{ConnectionTester, TestFailure, TestOutcome};
pub use controller::{StepController, Transition, WizardServices};
pub use error::WizardError;
pub use events::{Confirmation, ConnectorSide, ExitReason, ToastLevel, WizardEvent};
