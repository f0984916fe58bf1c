//! VOICEVOX wire models

use serde::{Deserialize, Serialize};

/// One speaker entry from `GET /speakers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerInfo {
    pub name: String,
    #[serde(default)]
    pub styles: Vec<SpeakerStyle>,
}

/// A named style and its voice id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerStyle {
    pub name: String,
    pub id: u32,
}

/// Fields of `POST /audio_query` responses that must be present for the
/// query to be usable. The full body is forwarded to `/synthesis` untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioQueryResponse {
    pub accent_phrases: Vec<serde_json::Value>,
    #[serde(rename = "speedScale")]
    pub speed_scale: f64,
}
