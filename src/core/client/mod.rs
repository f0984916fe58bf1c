//! Synthesis backend seam
//!
//! The orchestrator talks to the backend only through [`SynthesisBackend`];
//! catalog loading uses [`SpeakerSource`]. [`VoicevoxClient`] implements both
//! over HTTP.

mod models;
mod voicevox;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use models::{AudioQueryResponse, SpeakerInfo, SpeakerStyle};
pub use voicevox::{DEFAULT_API_URL, VoicevoxClient};

/// Response bodies are cut to this many characters in error messages
const ERROR_BODY_LIMIT: usize = 100;

/// Result type for backend calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Backend failure taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Request could not be sent or the body could not be read
    #[error("network error calling {endpoint}: {details}")]
    Network { endpoint: String, details: String },

    /// Backend answered with a non-success status
    #[error("{endpoint} returned status {status}: {}", truncate_body(.body))]
    Response {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Backend body did not decode
    #[error("invalid JSON in {context}: {details}")]
    InvalidJson { context: String, details: String },

    /// Client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let cut: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    format!("{cut}...")
}

/// Remote text-to-speech operations needed per segment
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Build a synthesis query blob for `text` spoken by `voice_id`
    async fn generate_query(&self, text: &str, voice_id: u32) -> ClientResult<Bytes>;

    /// Render a query blob to container audio bytes
    async fn render_audio(&self, query: Bytes, voice_id: u32) -> ClientResult<Bytes>;
}

/// Raw speaker catalog source
#[async_trait]
pub trait SpeakerSource: Send + Sync {
    async fn fetch_speakers(&self) -> ClientResult<Bytes>;
}
