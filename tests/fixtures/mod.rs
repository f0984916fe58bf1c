//! Test Fixtures Module
//!
//! - WAV payloads generated with `hound`
//! - VOICEVOX JSON bodies

// Not every test binary uses every fixture
#![allow(dead_code)]

pub mod wav_fixtures;

pub use wav_fixtures::*;

use serde_json::{Value, json};

/// `/speakers` body with both supported speakers and one unsupported one
pub fn speakers_json() -> Value {
    json!([
        {
            "name": "四国めたん",
            "speaker_uuid": "7ffcb7ce-00ec-4bdc-82cd-45a8889e43ff",
            "styles": [
                { "name": "ノーマル", "id": 2 },
                { "name": "あまあま", "id": 0 },
                { "name": "ツンツン", "id": 6 }
            ]
        },
        {
            "name": "ずんだもん",
            "speaker_uuid": "388f246b-8c41-4ac1-8e2d-5d79f3ff56d9",
            "styles": [
                { "name": "ノーマル", "id": 3 },
                { "name": "あまあま", "id": 1 },
                { "name": "ささやき", "id": 22 }
            ]
        },
        {
            "name": "春日部つむぎ",
            "styles": [{ "name": "ノーマル", "id": 8 }]
        }
    ])
}

/// Minimal `/audio_query` body the client accepts
pub fn audio_query_json() -> Value {
    json!({
        "accent_phrases": [],
        "speedScale": 1.0,
        "pitchScale": 0.0,
        "intonationScale": 1.0,
        "volumeScale": 1.0,
        "outputSamplingRate": 24000,
        "outputStereo": false
    })
}
