//! End-to-end script execution
//!
//! [`Engine`] runs parse, orchestrate, combine and write for one script.
//! Callers depend on the [`EngineExecutor`] trait so a disabled pipeline can be
//! swapped in without touching them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use super::context::RunContext;
use super::options::{EngineConfig, ExecuteOptions};
use super::orchestrator::SynthesisOrchestrator;
use crate::core::audio::{combine_wav_data, summarize_wav};
use crate::core::client::SynthesisBackend;
use crate::core::diagnostics::{SharedObserver, tracing_observer};
use crate::core::error::{SynthesisError, SynthesisResult};
use crate::core::script::{ScriptParser, TextParser};
use crate::core::voice::{VoiceCatalog, VoiceResolver};
use crate::utils::write_output;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisSummary {
    pub segments: usize,
    pub output_path: PathBuf,
    pub bytes_written: usize,
    /// `None` when the assembled file could not be read back
    pub duration_secs: Option<f64>,
}

/// Turns a script into an audio file
#[async_trait]
pub trait EngineExecutor: Send + Sync {
    async fn execute(
        &self,
        ctx: &RunContext,
        script: &str,
        output_path: &Path,
        options: &ExecuteOptions,
    ) -> SynthesisResult<SynthesisSummary>;
}

/// Full synthesis pipeline
pub struct Engine {
    config: EngineConfig,
    parser: Arc<dyn ScriptParser>,
    orchestrator: SynthesisOrchestrator,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        backend: Arc<dyn SynthesisBackend>,
        catalog: Arc<VoiceCatalog>,
    ) -> Self {
        Self::with_observer(config, backend, catalog, tracing_observer())
    }

    /// Create an engine whose parser and resolver report to `observer`
    pub fn with_observer(
        config: EngineConfig,
        backend: Arc<dyn SynthesisBackend>,
        catalog: Arc<VoiceCatalog>,
        observer: SharedObserver,
    ) -> Self {
        let parser = TextParser::new(config.max_segment_chars).with_observer(observer.clone());
        let resolver = Arc::new(VoiceResolver::new(catalog).with_observer(observer));
        let orchestrator = SynthesisOrchestrator::new(
            backend,
            resolver,
            config.max_parallel_segments,
            config.segment_timeout,
            config.segment_rate_limit,
        );

        Self {
            config,
            parser: Arc::new(parser),
            orchestrator,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse and synthesize `script`, returning the combined WAV and the
    /// number of segments it holds
    pub async fn synthesize(
        &self,
        ctx: &RunContext,
        script: &str,
        options: &ExecuteOptions,
    ) -> SynthesisResult<(Vec<u8>, usize)> {
        let fallback_tag = options.fallback_tag_or(&self.config.fallback_tag);
        let mut segments = self.parser.parse(script, fallback_tag);

        if segments.is_empty() {
            return Err(SynthesisError::NoSegments);
        }

        info!(segments = segments.len(), "Script parsed");

        let payloads = self.orchestrator.execute(ctx, &mut segments).await?;
        let audio = combine_wav_data(&payloads)?;

        Ok((audio, segments.len()))
    }
}

#[async_trait]
impl EngineExecutor for Engine {
    async fn execute(
        &self,
        ctx: &RunContext,
        script: &str,
        output_path: &Path,
        options: &ExecuteOptions,
    ) -> SynthesisResult<SynthesisSummary> {
        let started = Instant::now();

        let (audio, segments) = self.synthesize(ctx, script, options).await?;

        let duration_secs = match summarize_wav(&audio) {
            Ok(summary) => Some(summary.duration_secs),
            Err(e) => {
                warn!(error = %e, "Could not read back assembled audio");
                None
            }
        };

        write_output(output_path, &audio)
            .await
            .map_err(|source| SynthesisError::Output {
                path: output_path.to_path_buf(),
                source,
            })?;

        info!(
            segments,
            bytes = audio.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            path = %output_path.display(),
            "Synthesis complete"
        );

        Ok(SynthesisSummary {
            segments,
            output_path: output_path.to_path_buf(),
            bytes_written: audio.len(),
            duration_secs,
        })
    }
}

/// Executor used when synthesis is disabled; writes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExecutor;

#[async_trait]
impl EngineExecutor for NoopExecutor {
    async fn execute(
        &self,
        _ctx: &RunContext,
        script: &str,
        output_path: &Path,
        _options: &ExecuteOptions,
    ) -> SynthesisResult<SynthesisSummary> {
        info!(
            script_len = script.chars().count(),
            path = %output_path.display(),
            "Synthesis disabled, skipping"
        );

        Ok(SynthesisSummary {
            segments: 0,
            output_path: output_path.to_path_buf(),
            bytes_written: 0,
            duration_secs: None,
        })
    }
}
