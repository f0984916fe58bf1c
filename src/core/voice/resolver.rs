use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::VoiceCatalog;
use crate::core::diagnostics::{Diagnostic, SharedObserver, tracing_observer};
use crate::core::script::Segment;

/// No voice id could be derived for a tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no voice id found for tag {tag}{}", segment_suffix(*.index))]
pub struct ResolutionError {
    pub tag: String,
    pub index: Option<usize>,
}

fn segment_suffix(index: Option<usize>) -> String {
    index.map(|i| format!(" (segment {i})")).unwrap_or_default()
}

/// Resolves segment tags to voice ids with a shared cache
///
/// Lookup order: cache, exact tag, then the speaker's default style via the
/// base tag. Fallback hits are cached under the original tag.
pub struct VoiceResolver {
    catalog: Arc<VoiceCatalog>,
    cache: RwLock<HashMap<String, u32>>,
    observer: SharedObserver,
}

impl VoiceResolver {
    pub fn new(catalog: Arc<VoiceCatalog>) -> Self {
        Self {
            catalog,
            cache: RwLock::new(HashMap::new()),
            observer: tracing_observer(),
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    /// Resolve a tag outside any segment context
    pub fn resolve(&self, tag: &str, base_tag: &str) -> Result<u32, ResolutionError> {
        self.resolve_at(tag, base_tag, None)
    }

    /// Resolve a tag, attributing diagnostics and errors to `index`
    pub fn resolve_at(
        &self,
        tag: &str,
        base_tag: &str,
        index: Option<usize>,
    ) -> Result<u32, ResolutionError> {
        if let Some(id) = self.cache.read().get(tag).copied() {
            return Ok(id);
        }

        if let Some(id) = self.catalog.style_id(tag) {
            self.cache.write().insert(tag.to_string(), id);
            return Ok(id);
        }

        if !base_tag.is_empty() {
            if let Some(default_tag) = self.catalog.default_tag(base_tag) {
                if let Some(id) = self.catalog.style_id(default_tag) {
                    self.observer.observe(Diagnostic::StyleFallback {
                        index,
                        tag: tag.to_string(),
                        fallback_tag: default_tag.to_string(),
                    });
                    self.cache.write().insert(tag.to_string(), id);
                    return Ok(id);
                }
            }
        }

        Err(ResolutionError {
            tag: tag.to_string(),
            index,
        })
    }

    /// Resolve every segment in place and return the failures in order
    pub fn resolve_segments(&self, segments: &mut [Segment]) -> Vec<ResolutionError> {
        let mut errors = Vec::new();

        for (index, segment) in segments.iter_mut().enumerate() {
            match self.resolve_at(&segment.combined_tag, &segment.base_tag, Some(index)) {
                Ok(id) => {
                    segment.voice_id = Some(id);
                    segment.resolution_error = None;
                }
                Err(err) => {
                    segment.voice_id = None;
                    segment.resolution_error = Some(err.clone());
                    errors.push(err);
                }
            }
        }

        errors
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}
