//! Synthesis engine
//!
//! - `context`: run-scoped cancellation and deadline
//! - `options`: engine tuning and per-run overrides
//! - `orchestrator`: bounded, paced fan-out to the backend
//! - `executor`: end-to-end pipeline and the executor trait
//! - `factory`: executor construction from configuration

mod context;
mod executor;
mod factory;
mod options;
mod orchestrator;

pub use context::RunContext;
pub use executor::{Engine, EngineExecutor, NoopExecutor, SynthesisSummary};
pub use factory::build_executor;
pub use options::{
    DEFAULT_FALLBACK_TAG, DEFAULT_MAX_PARALLEL_SEGMENTS, DEFAULT_SEGMENT_RATE_LIMIT,
    DEFAULT_SEGMENT_TIMEOUT, EngineConfig, ExecuteOptions,
};
pub use orchestrator::SynthesisOrchestrator;
