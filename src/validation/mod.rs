//! Validation Module
//!
//! Gates run by the step controller before forward transitions.
//!
//! - [`cron`]: Five-field schedule grammar
//! - [`rules`]: Name, stream selection and panel checks

pub mod cron;
pub mod rules;

pub use cron::{validate_cron, CronError, CronPosition};
pub use rules::{
    panel_allows_advance, require_job_name, validate_streams, StreamSelectionError, Validatable,
};
