//! Streams Selection
//!
//! The structured record of which upstream streams a job includes,
//! grouped by namespace, each entry carrying its own options.
//!
//! # Example JSON Format
//!
//! ```json
//! {
//!   "selected_streams": {
//!     "shop": [
//!       { "stream_name": "orders", "partition_regex": "", "normalization": true },
//!       { "stream_name": "customers", "filter": "country = 'NL'" }
//!     ]
//!   },
//!   "streams": []
//! }
//! ```
//!
//! Keys other than `selected_streams` belong to the schema panel and are
//! carried through untouched.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single stream entry inside a namespace.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SelectedStream {
    /// Upstream stream/table name
    pub stream_name: String,

    /// Partitioning expression for the destination
    #[serde(default)]
    pub partition_regex: String,

    /// Whether nested records are flattened at the destination
    #[serde(default)]
    pub normalization: bool,

    /// Row filter; present-but-blank is rejected before submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Entries kept in the panel but unchecked by the user
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SelectedStream {
    /// Creates an enabled stream entry with default options.
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            partition_regex: String::new(),
            normalization: false,
            filter: None,
            disabled: false,
        }
    }

    /// Sets a row filter on this stream.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Marks this entry as unchecked.
    pub fn unchecked(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// True when a filter field exists but holds only whitespace.
    pub fn has_blank_filter(&self) -> bool {
        self.filter
            .as_deref()
            .map(|f| f.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Fully-qualified stream identifier (`namespace.stream`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId {
    pub namespace: String,
    pub stream_name: String,
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.stream_name)
        } else {
            write!(f, "{}.{}", self.namespace, self.stream_name)
        }
    }
}

/// Which streams are part of the job, keyed by namespace.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StreamsSelection {
    #[serde(default)]
    pub selected_streams: BTreeMap<String, Vec<SelectedStream>>,

    /// Schema-panel state outside the selection itself
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StreamsSelection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stream under a namespace.
    pub fn with_stream(mut self, namespace: impl Into<String>, stream: SelectedStream) -> Self {
        self.selected_streams
            .entry(namespace.into())
            .or_default()
            .push(stream);
        self
    }

    /// Canonical form of the selection.
    ///
    /// Unchecked entries are dropped, repeated stream names within a
    /// namespace keep their first occurrence, and namespaces left with
    /// nothing selected disappear.
    pub fn normalized(&self) -> StreamsSelection {
        let mut selected_streams = BTreeMap::new();

        for (namespace, streams) in &self.selected_streams {
            let mut seen: HashSet<&str> = HashSet::new();
            let kept: Vec<SelectedStream> = streams
                .iter()
                .filter(|s| !s.disabled)
                .filter(|s| seen.insert(s.stream_name.as_str()))
                .cloned()
                .collect();

            if !kept.is_empty() {
                selected_streams.insert(namespace.clone(), kept);
            }
        }

        StreamsSelection {
            selected_streams,
            extra: self.extra.clone(),
        }
    }

    /// The set of checked stream identifiers.
    pub fn selected_ids(&self) -> BTreeSet<StreamId> {
        self.selected_streams
            .iter()
            .flat_map(|(namespace, streams)| {
                streams.iter().filter(|s| !s.disabled).map(move |s| StreamId {
                    namespace: namespace.clone(),
                    stream_name: s.stream_name.clone(),
                })
            })
            .collect()
    }

    /// Checked streams paired with their namespace.
    pub fn checked(&self) -> impl Iterator<Item = (&str, &SelectedStream)> {
        self.selected_streams.iter().flat_map(|(namespace, streams)| {
            streams
                .iter()
                .filter(|s| !s.disabled)
                .map(move |s| (namespace.as_str(), s))
        })
    }

    /// Returns true if nothing is checked.
    pub fn is_empty(&self) -> bool {
        self.checked().next().is_none()
    }

    /// Serializes to the transport blob.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a transport blob.
    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}
