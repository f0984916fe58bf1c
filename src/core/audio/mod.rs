//! Audio payload assembly

mod wav;

use thiserror::Error;

pub use wav::{
    AudioSummary, CHUNK_HEADER_LEN, RIFF_HEADER_LEN, WavParts, combine_wav_data,
    extract_audio_data, summarize_wav,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// Structural violation in one payload
    #[error("invalid WAV header in payload {index}: {details}")]
    InvalidHeader { index: usize, details: String },

    #[error("no audio data to combine")]
    NoAudioData,

    #[error("combined audio of {bytes} bytes exceeds the RIFF size limit")]
    TooLarge { bytes: usize },

    #[error("failed to decode WAV: {0}")]
    Decode(String),
}
