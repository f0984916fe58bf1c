//! Bounded, paced fan-out of segment synthesis
//!
//! A run goes through four phases:
//!
//! 1. every segment is resolved to a voice id; if all fail, the run aborts
//!    before touching the backend
//! 2. resolvable segments are dispatched one by one, each dispatch waiting on
//!    the pacing gate and then on a concurrency slot
//! 3. all spawned tasks are joined and results land in a position-indexed
//!    table, so output order never depends on completion order
//! 4. any failure from phases 1 to 3 fails the whole run with a [`BatchError`]
//!
//! Cancelling the run context stops dispatch at the next gate and aborts
//! in-flight tasks through their child tokens.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::context::RunContext;
use crate::core::client::SynthesisBackend;
use crate::core::error::{BatchError, SegmentStage, SynthesisError, SynthesisResult};
use crate::core::script::Segment;
use crate::core::voice::VoiceResolver;

/// Drives backend synthesis for a list of segments
pub struct SynthesisOrchestrator {
    backend: Arc<dyn SynthesisBackend>,
    resolver: Arc<VoiceResolver>,
    max_parallel: usize,
    segment_timeout: Duration,
    // None when pacing is disabled
    limiter: Option<DefaultDirectRateLimiter>,
}

impl std::fmt::Debug for SynthesisOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisOrchestrator")
            .field("max_parallel", &self.max_parallel)
            .field("segment_timeout", &self.segment_timeout)
            .field("paced", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl SynthesisOrchestrator {
    /// Create an orchestrator
    ///
    /// `max_parallel` is clamped to at least 1. A zero `rate_limit` disables
    /// pacing.
    pub fn new(
        backend: Arc<dyn SynthesisBackend>,
        resolver: Arc<VoiceResolver>,
        max_parallel: usize,
        segment_timeout: Duration,
        rate_limit: Duration,
    ) -> Self {
        let limiter = Quota::with_period(rate_limit)
            .map(|quota| RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN)));

        Self {
            backend,
            resolver,
            max_parallel: max_parallel.max(1),
            segment_timeout,
            limiter,
        }
    }

    pub fn resolver(&self) -> &VoiceResolver {
        &self.resolver
    }

    /// Resolve, dispatch and collect audio for `segments`
    ///
    /// On success the payloads are returned in segment order. Any resolution
    /// or dispatch failure fails the run with a [`BatchError`] listing every
    /// failure; partial results are discarded.
    pub async fn execute(
        &self,
        ctx: &RunContext,
        segments: &mut [Segment],
    ) -> SynthesisResult<Vec<Bytes>> {
        let total = segments.len();

        let resolution_errors = self.resolver.resolve_segments(segments);
        let mut errors: Vec<String> = resolution_errors.iter().map(ToString::to_string).collect();

        if total > 0 && resolution_errors.len() == total {
            error!(segments = total, "No segment could be resolved to a voice");
            return Err(BatchError::new(errors).into());
        }

        info!(
            segments = total,
            unresolved = resolution_errors.len(),
            max_parallel = self.max_parallel,
            "Starting synthesis batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut handles = Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, segment) in segments.iter().enumerate() {
            if !segment.is_dispatchable() {
                continue;
            }
            let Some(voice_id) = segment.voice_id else {
                continue;
            };

            if let Some(limiter) = &self.limiter {
                tokio::select! {
                    biased;
                    _ = ctx.cancel_token.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = limiter.until_ready() => {}
                }
            }

            let permit = tokio::select! {
                biased;
                _ = ctx.cancel_token.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        cancelled = true;
                        break;
                    }
                },
            };

            let task_ctx = ctx.child();
            let deadline = ctx.segment_deadline(self.segment_timeout);
            let backend = Arc::clone(&self.backend);
            let text = segment.text.clone();

            debug!(segment_index = index, voice_id, "Dispatching segment");

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let result = synthesize_segment(
                    backend.as_ref(),
                    &task_ctx,
                    index,
                    &text,
                    voice_id,
                    deadline,
                )
                .await;
                (index, result)
            }));
        }

        if cancelled {
            warn!(
                dispatched = handles.len(),
                "Run cancelled, no further segments dispatched"
            );
        }

        let mut slots: Vec<Option<Bytes>> = vec![None; total];
        for joined in join_all(handles).await {
            match joined {
                Ok((index, Ok(audio))) => slots[index] = Some(audio),
                Ok((index, Err(err))) => {
                    error!(segment_index = index, error = %err, "Segment synthesis failed");
                    errors.push(err.to_string());
                }
                Err(join_err) => errors.push(format!("segment task failed: {join_err}")),
            }
        }

        if cancelled {
            errors.push(SynthesisError::Cancelled.to_string());
        }

        if !errors.is_empty() {
            let batch = BatchError::new(errors);
            error!(errors = batch.total, "Synthesis batch failed");
            return Err(batch.into());
        }

        let payloads: Vec<Bytes> = slots.into_iter().flatten().collect();
        info!(payloads = payloads.len(), "Synthesis batch complete");
        Ok(payloads)
    }
}

/// Both backend round-trips for one segment, bounded by `deadline`
async fn synthesize_segment(
    backend: &dyn SynthesisBackend,
    ctx: &RunContext,
    index: usize,
    text: &str,
    voice_id: u32,
    deadline: Instant,
) -> SynthesisResult<Bytes> {
    let budget = deadline.saturating_duration_since(Instant::now());

    let work = async {
        let query = backend
            .generate_query(text, voice_id)
            .await
            .map_err(|source| SynthesisError::Segment {
                index,
                stage: SegmentStage::AudioQuery,
                source,
            })?;

        backend
            .render_audio(query, voice_id)
            .await
            .map_err(|source| SynthesisError::Segment {
                index,
                stage: SegmentStage::Synthesis,
                source,
            })
    };

    tokio::select! {
        biased;
        _ = ctx.cancel_token.cancelled() => Err(SynthesisError::SegmentCancelled { index }),
        result = tokio::time::timeout_at(deadline, work) => match result {
            Ok(outcome) => outcome,
            Err(_) => Err(SynthesisError::SegmentTimeout { index, timeout: budget }),
        },
    }
}
