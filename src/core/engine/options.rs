use std::time::Duration;

use crate::core::script::DEFAULT_MAX_SEGMENT_CHARS;

pub const DEFAULT_MAX_PARALLEL_SEGMENTS: usize = 6;
pub const DEFAULT_SEGMENT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_SEGMENT_RATE_LIMIT: Duration = Duration::from_millis(100);
pub const DEFAULT_FALLBACK_TAG: &str = "[ずんだもん][ノーマル]";

/// Tuning values consumed by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Backend round-trips allowed in flight at once
    pub max_parallel_segments: usize,
    /// Per-segment deadline covering both backend calls
    pub segment_timeout: Duration,
    /// Minimum interval between dispatches; zero disables pacing
    pub segment_rate_limit: Duration,
    /// Character budget per segment
    pub max_segment_chars: usize,
    /// Tag for text that never sees a speaker tag; empty disables it
    pub fallback_tag: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallel_segments: DEFAULT_MAX_PARALLEL_SEGMENTS,
            segment_timeout: DEFAULT_SEGMENT_TIMEOUT,
            segment_rate_limit: DEFAULT_SEGMENT_RATE_LIMIT,
            max_segment_chars: DEFAULT_MAX_SEGMENT_CHARS,
            fallback_tag: DEFAULT_FALLBACK_TAG.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_parallel_segments == 0 {
            return Err("max_parallel_segments must be greater than 0".to_string());
        }
        if self.segment_timeout.is_zero() {
            return Err("segment_timeout must be greater than 0".to_string());
        }
        if self.max_segment_chars == 0 {
            return Err("max_segment_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Per-run overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    pub fallback_tag: Option<String>,
}

impl ExecuteOptions {
    pub fn with_fallback_tag(tag: impl Into<String>) -> Self {
        Self {
            fallback_tag: Some(tag.into()),
        }
    }

    /// The override when set and non-empty, otherwise `default`
    pub fn fallback_tag_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.fallback_tag.as_deref() {
            Some(tag) if !tag.is_empty() => tag,
            _ => default,
        }
    }
}
