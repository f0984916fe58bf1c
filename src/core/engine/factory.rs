use std::sync::Arc;

use tracing::info;

use super::executor::{Engine, EngineExecutor, NoopExecutor};
use crate::config::Config;
use crate::core::client::VoicevoxClient;
use crate::core::error::SynthesisResult;
use crate::core::voice::load_catalog;

/// Build the executor described by `config`
///
/// When `enabled` is false a [`NoopExecutor`] is returned and the backend is
/// never contacted. Otherwise the client is built and the voice catalog is
/// fetched before the engine is assembled.
pub async fn build_executor(
    config: &Config,
    enabled: bool,
) -> SynthesisResult<Arc<dyn EngineExecutor>> {
    if !enabled {
        info!("Synthesis disabled, using no-op executor");
        return Ok(Arc::new(NoopExecutor));
    }

    let client = Arc::new(VoicevoxClient::new(&config.api_url, config.http_timeout)?);
    let catalog = load_catalog(client.as_ref(), config.catalog_timeout).await?;

    info!(
        api_url = %config.api_url,
        styles = catalog.len(),
        max_parallel = config.engine.max_parallel_segments,
        "Synthesis engine ready"
    );

    Ok(Arc::new(Engine::new(
        config.engine.clone(),
        client,
        Arc::new(catalog),
    )))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::core::engine::{ExecuteOptions, RunContext};

    #[tokio::test]
    async fn test_disabled_executor_skips_backend() {
        let config = Config {
            api_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };

        let executor = build_executor(&config, false).await.unwrap();
        let summary = executor
            .execute(
                &RunContext::new(),
                "[ずんだもん][ノーマル] テスト",
                Path::new("unused.wav"),
                &ExecuteOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(summary.bytes_written, 0);
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails_catalog_load() {
        let config = Config {
            api_url: "http://127.0.0.1:9".to_string(),
            catalog_timeout: std::time::Duration::from_secs(2),
            ..Default::default()
        };

        assert!(build_executor(&config, true).await.is_err());
    }
}
