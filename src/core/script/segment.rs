use crate::core::voice::ResolutionError;

/// One unit of speech to synthesize
///
/// Created by the parser with non-empty text, updated once by the voice
/// resolver, then read by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Speaker and style tag, e.g. `[ずんだもん][ノーマル]`
    pub combined_tag: String,
    /// Speaker-only prefix of the combined tag, e.g. `[ずんだもん]`
    pub base_tag: String,
    /// Text with emotion annotations stripped and whitespace trimmed
    pub text: String,
    pub voice_id: Option<u32>,
    pub resolution_error: Option<ResolutionError>,
}

impl Segment {
    pub fn new(
        combined_tag: impl Into<String>,
        base_tag: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            combined_tag: combined_tag.into(),
            base_tag: base_tag.into(),
            text: text.into(),
            voice_id: None,
            resolution_error: None,
        }
    }

    /// Whether this segment should be sent to the backend
    pub fn is_dispatchable(&self) -> bool {
        self.resolution_error.is_none() && self.voice_id.is_some() && !self.text.is_empty()
    }

    /// Text length in characters
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_segment_is_unresolved() {
        let segment = Segment::new("[めたん][ノーマル]", "[めたん]", "こんにちは");
        assert_eq!(segment.voice_id, None);
        assert!(segment.resolution_error.is_none());
        assert!(!segment.is_dispatchable());
        assert_eq!(segment.char_count(), 5);
    }

    #[test]
    fn test_resolved_segment_is_dispatchable() {
        let mut segment = Segment::new("[めたん][ノーマル]", "[めたん]", "はい");
        segment.voice_id = Some(2);
        assert!(segment.is_dispatchable());

        segment.resolution_error = Some(ResolutionError {
            tag: segment.combined_tag.clone(),
            index: Some(0),
        });
        assert!(!segment.is_dispatchable());
    }
}
