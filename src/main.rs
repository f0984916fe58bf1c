use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use voicevox_script::{
    Config, ExecuteOptions, RunContext, VoicevoxClient, build_executor, load_catalog,
};

/// Multi-speaker script synthesis for VOICEVOX
#[derive(Parser, Debug)]
#[command(name = "voicevox-script")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize a tagged script into a single WAV file
    Synth {
        /// Script file to read ("-" reads stdin)
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: PathBuf,

        /// Output WAV path
        #[arg(short = 'o', long = "output", default_value = "tts_output.wav")]
        output: PathBuf,

        /// Tag for untagged text when no segment precedes it
        #[arg(long = "fallback-tag", value_name = "TAG")]
        fallback_tag: Option<String>,
    },

    /// List the voice tags the engine can resolve
    Speakers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = if let Some(config_path) = cli.config {
        info!(path = %config_path.display(), "Loading configuration");
        Config::from_file(&config_path).map_err(|e| anyhow!(e.to_string()))?
    } else {
        Config::from_env().map_err(|e| anyhow!(e.to_string()))?
    };

    match cli.command {
        Commands::Synth {
            input,
            output,
            fallback_tag,
        } => synth(&config, &input, &output, fallback_tag).await,
        Commands::Speakers => speakers(&config).await,
    }
}

async fn synth(
    config: &Config,
    input: &Path,
    output: &Path,
    fallback_tag: Option<String>,
) -> anyhow::Result<()> {
    let script = read_script(input).await?;
    let executor = build_executor(config, true)
        .await
        .context("Failed to initialize synthesis engine. Is the VOICEVOX engine running?")?;

    let ctx = RunContext::new();
    let cancel = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling synthesis");
            cancel.cancel();
        }
    });

    let options = fallback_tag.map(ExecuteOptions::with_fallback_tag).unwrap_or_default();
    let summary = executor.execute(&ctx, &script, output, &options).await?;

    let absolute = std::path::absolute(&summary.output_path)
        .unwrap_or_else(|_| summary.output_path.clone());
    info!(
        segments = summary.segments,
        bytes = summary.bytes_written,
        duration_secs = summary.duration_secs.unwrap_or_default(),
        "Synthesis finished"
    );
    println!("{}", absolute.display());

    Ok(())
}

async fn speakers(config: &Config) -> anyhow::Result<()> {
    let client = VoicevoxClient::new(&config.api_url, config.http_timeout)?;
    let catalog = load_catalog(&client, config.catalog_timeout)
        .await
        .context("Failed to load speaker catalog")?;

    for (tag, id) in catalog.entries() {
        println!("{tag}\t{id}");
    }

    Ok(())
}

async fn read_script(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut script = String::new();
        tokio::io::stdin()
            .read_to_string(&mut script)
            .await
            .context("Failed to read script from stdin")?;
        return Ok(script);
    }

    tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read script {}", input.display()))
}
