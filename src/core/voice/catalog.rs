use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::core::client::{ClientError, SpeakerInfo, SpeakerSource};

/// Speakers this tool knows how to address: (backend name, speaker tag)
pub const SUPPORTED_SPEAKERS: [(&str, &str); 2] =
    [("四国めたん", "[めたん]"), ("ずんだもん", "[ずんだもん]")];

/// Backend style names and the style tags they map to
pub const STYLE_TAGS: [(&str, &str); 5] = [
    ("ノーマル", "[ノーマル]"),
    ("あまあま", "[あまあま]"),
    ("ツンツン", "[ツンツン]"),
    ("セクシー", "[セクシー]"),
    ("ささやき", "[ささやき]"),
];

/// Style tag registered as each speaker's default
pub const DEFAULT_STYLE_TAG: &str = "[ノーマル]";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("default style [ノーマル] missing for required speakers: {}", .speakers.join(", "))]
    MissingDefaultStyle { speakers: Vec<String> },

    #[error("speaker catalog fetch timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
}

/// Tag to voice id lookup, built once per backend fetch
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    // combined tag -> voice id
    style_index: HashMap<String, u32>,
    // base tag -> combined default tag
    default_index: HashMap<String, String>,
}

impl VoiceCatalog {
    /// Build the catalog from a backend speaker list
    ///
    /// Speakers and styles outside the supported tables are skipped. Fails if
    /// any supported speaker lacks a default style.
    pub fn from_speakers(speakers: &[SpeakerInfo]) -> Result<Self, CatalogError> {
        let speaker_tags: HashMap<&str, &str> = SUPPORTED_SPEAKERS.into_iter().collect();
        let style_tags: HashMap<&str, &str> = STYLE_TAGS.into_iter().collect();

        let mut catalog = Self::default();

        for speaker in speakers {
            let Some(speaker_tag) = speaker_tags.get(speaker.name.as_str()) else {
                continue;
            };

            for style in &speaker.styles {
                let Some(style_tag) = style_tags.get(style.name.as_str()) else {
                    debug!(
                        speaker = %speaker.name,
                        style = %style.name,
                        "Skipping unsupported style"
                    );
                    continue;
                };

                let combined = format!("{speaker_tag}{style_tag}");
                if *style_tag == DEFAULT_STYLE_TAG {
                    catalog
                        .default_index
                        .insert(speaker_tag.to_string(), combined.clone());
                }
                catalog.style_index.insert(combined, style.id);
            }
        }

        let missing: Vec<String> = SUPPORTED_SPEAKERS
            .iter()
            .filter(|(_, tag)| !catalog.default_index.contains_key(*tag))
            .map(|(name, tag)| {
                error!(
                    speaker = %tag,
                    required_style = DEFAULT_STYLE_TAG,
                    "Default style missing for required speaker"
                );
                name.to_string()
            })
            .collect();

        if !missing.is_empty() {
            return Err(CatalogError::MissingDefaultStyle { speakers: missing });
        }

        Ok(catalog)
    }

    /// Voice id for an exact combined tag
    pub fn style_id(&self, tag: &str) -> Option<u32> {
        self.style_index.get(tag).copied()
    }

    /// Combined default tag for a speaker tag
    pub fn default_tag(&self, base_tag: &str) -> Option<&str> {
        self.default_index.get(base_tag).map(String::as_str)
    }

    /// All `(combined tag, voice id)` pairs sorted by tag
    pub fn entries(&self) -> Vec<(&str, u32)> {
        let mut entries: Vec<(&str, u32)> = self
            .style_index
            .iter()
            .map(|(tag, id)| (tag.as_str(), *id))
            .collect();
        entries.sort_unstable();
        entries
    }

    pub fn len(&self) -> usize {
        self.style_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.style_index.is_empty()
    }
}

/// Fetch the speaker list and build the catalog, bounded by `timeout`
pub async fn load_catalog(
    source: &dyn SpeakerSource,
    timeout: Duration,
) -> Result<VoiceCatalog, CatalogError> {
    let body = tokio::time::timeout(timeout, source.fetch_speakers())
        .await
        .map_err(|_| CatalogError::Timeout(timeout))??;

    let speakers: Vec<SpeakerInfo> =
        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidJson {
            context: "/speakers response".to_string(),
            details: e.to_string(),
        })?;

    let catalog = VoiceCatalog::from_speakers(&speakers)?;
    info!(styles_count = catalog.len(), "Voice catalog loaded");

    Ok(catalog)
}
