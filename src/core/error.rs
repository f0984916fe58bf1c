//! Run-level error types
//!
//! Every failure in a synthesis run ends up as a single [`SynthesisError`].
//! Resolution and dispatch failures are collected first and reported together
//! through [`BatchError`], so the caller always sees the complete accounting.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::audio::AudioError;
use crate::core::client::ClientError;
use crate::core::voice::{CatalogError, ResolutionError};

/// Result type for synthesis runs
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Backend call that failed for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStage {
    /// `generate query` round-trip
    AudioQuery,
    /// `render query to audio` round-trip
    Synthesis,
}

impl fmt::Display for SegmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentStage::AudioQuery => f.write_str("audio query"),
            SegmentStage::Synthesis => f.write_str("synthesis"),
        }
    }
}

/// Aggregated failure report for one run
///
/// Carries every individual failure message in segment order plus the total
/// count. A non-empty batch error fails the whole run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{total} errors occurred during synthesis batch:\n- {}", .details.join("\n- "))]
pub struct BatchError {
    pub total: usize,
    pub details: Vec<String>,
}

impl BatchError {
    pub fn new(details: Vec<String>) -> Self {
        Self {
            total: details.len(),
            details,
        }
    }
}

/// Comprehensive error type for a synthesis run
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Backend transport, status or body failure outside a segment context
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Voice catalog could not be built
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No voice id derivable for a segment tag
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Malformed payload or empty assembly input
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// A backend round-trip failed for one segment
    #[error("segment {index} {stage} failed: {source}")]
    Segment {
        index: usize,
        stage: SegmentStage,
        #[source]
        source: ClientError,
    },

    /// A segment did not finish before its deadline
    #[error("segment {index} timed out after {} ms", .timeout.as_millis())]
    SegmentTimeout { index: usize, timeout: Duration },

    /// A dispatched segment observed cancellation
    #[error("segment {index} was cancelled")]
    SegmentCancelled { index: usize },

    /// The run context was cancelled
    #[error("synthesis run was cancelled")]
    Cancelled,

    /// The script produced no segments to synthesize
    #[error("no valid segments could be extracted from the script")]
    NoSegments,

    /// One or more segments failed; nothing was written
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Writing the final artifact failed
    #[error("failed to write output {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Engine settings are unusable
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_lists_every_failure() {
        let err = BatchError::new(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(err.total, 2);
        assert_eq!(
            err.to_string(),
            "2 errors occurred during synthesis batch:\n- first\n- second"
        );
    }

    #[test]
    fn test_batch_error_passes_through_synthesis_error() {
        let batch = BatchError::new(vec!["segment 0 failed".to_string()]);
        let err = SynthesisError::from(batch.clone());

        assert_eq!(err.to_string(), batch.to_string());
        assert!(std::error::Error::source(&batch).is_none());
    }

    #[test]
    fn test_segment_error_message() {
        let err = SynthesisError::Segment {
            index: 3,
            stage: SegmentStage::Synthesis,
            source: ClientError::Network {
                endpoint: "/synthesis".to_string(),
                details: "connection reset".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.starts_with("segment 3 synthesis failed"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_timeout_message_in_millis() {
        let err = SynthesisError::SegmentTimeout {
            index: 0,
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "segment 0 timed out after 1500 ms");
    }
}
