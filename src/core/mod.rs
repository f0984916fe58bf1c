pub mod audio;
pub mod client;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod script;
pub mod voice;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioSummary, combine_wav_data, extract_audio_data, summarize_wav};

pub use client::{
    ClientError, ClientResult, DEFAULT_API_URL, SpeakerInfo, SpeakerSource, SpeakerStyle,
    SynthesisBackend, VoicevoxClient,
};

pub use diagnostics::{CollectingObserver, Diagnostic, DiagnosticObserver, SharedObserver};

pub use engine::{
    Engine, EngineConfig, EngineExecutor, ExecuteOptions, NoopExecutor, RunContext,
    SynthesisOrchestrator, SynthesisSummary, build_executor,
};

pub use error::{BatchError, SegmentStage, SynthesisError, SynthesisResult};

pub use script::{ScriptParser, Segment, TextParser};

pub use voice::{CatalogError, ResolutionError, VoiceCatalog, VoiceResolver, load_catalog};
