//! Draft Module
//!
//! The job-in-progress and its local persistence.
//!
//! # Structure
//!
//! - [`model`]: Draft record, wizard steps and panel change events
//! - [`streams`]: Stream selection and its normalization
//! - [`store`]: Saved-draft records and keyed stores

pub mod model;
pub mod store;
pub mod streams;

pub use model::{
    config_blob, ConnectorChange, DestinationSettings, Draft, SourceSettings, WizardEntry,
    WizardStep,
};
pub use store::{DraftStore, JsonFileDraftStore, MemoryDraftStore, SavedDraft, StoreError};
pub use streams::{SelectedStream, StreamId, StreamsSelection};
