//! Script segmentation
//!
//! Turns an annotated multi-speaker script into ordered, length-bounded
//! [`Segment`]s. Parsing never fails; anomalies are reported through the
//! parser's diagnostic observer.

mod parser;
mod segment;

pub use parser::{DEFAULT_MAX_SEGMENT_CHARS, EMOTION_TAGS, TextParser};
pub use segment::Segment;

/// Splits script text into synthesizable segments
pub trait ScriptParser: Send + Sync {
    /// Parse `script` into segments. `fallback_tag` is used for text that
    /// never sees a speaker tag; an empty string disables the fallback.
    fn parse(&self, script: &str, fallback_tag: &str) -> Vec<Segment>;
}
