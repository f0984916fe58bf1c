//! Structured diagnostic events
//!
//! The segmenter and voice resolver never log directly. Recoverable anomalies
//! are reported as [`Diagnostic`] values to a [`DiagnosticObserver`], which
//! keeps both components testable without a tracing subscriber installed.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, warn};

/// Recoverable anomaly observed while parsing or resolving a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Untagged text appeared before any speaker tag and was held back
    UntaggedLineBuffered { line: String },
    /// A chunk of text exceeded the per-segment budget and was split
    SegmentSplit { tag: String, limit: usize },
    /// Leftover untagged text was attached to the fallback tag
    TrailingTextFallback { tag: String },
    /// Leftover untagged text had nowhere to go and was discarded
    TrailingTextDropped { text: String },
    /// A segment tag had no leading bracketed speaker portion
    BaseTagMissing { tag: String },
    /// A segment resolved through its speaker's default style
    StyleFallback {
        index: Option<usize>,
        tag: String,
        fallback_tag: String,
    },
}

/// Sink for diagnostic events
pub trait DiagnosticObserver: Send + Sync {
    fn observe(&self, diagnostic: Diagnostic);
}

/// Shared observer handle
pub type SharedObserver = Arc<dyn DiagnosticObserver>;

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DiagnosticObserver for TracingObserver {
    fn observe(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::UntaggedLineBuffered { line } => {
                warn!(line = %line, "Untagged line before any speaker tag, holding for next tag");
            }
            Diagnostic::SegmentSplit { tag, limit } => {
                warn!(tag = %tag, limit, "Text exceeds segment budget, splitting");
            }
            Diagnostic::TrailingTextFallback { tag } => {
                warn!(tag = %tag, "Trailing untagged text assigned to fallback tag");
            }
            Diagnostic::TrailingTextDropped { text } => {
                error!(text = %text, "Trailing untagged text discarded, no tag available");
            }
            Diagnostic::BaseTagMissing { tag } => {
                error!(tag = %tag, "Could not extract base tag");
            }
            Diagnostic::StyleFallback {
                index,
                tag,
                fallback_tag,
            } => {
                warn!(
                    segment_index = ?index,
                    tag = %tag,
                    fallback_tag = %fallback_tag,
                    "Style not found, using speaker default"
                );
            }
        }
    }
}

/// Records every diagnostic in arrival order
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events observed so far
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl DiagnosticObserver for CollectingObserver {
    fn observe(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}

/// Default observer used when callers do not supply one
pub fn tracing_observer() -> SharedObserver {
    Arc::new(TracingObserver)
}
