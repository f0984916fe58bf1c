use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present here
/// override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// voicevox:
///   api_url: "http://localhost:50021"
///   http_timeout_seconds: 60
///   catalog_timeout_seconds: 5
///
/// engine:
///   max_parallel_segments: 6
///   segment_timeout_seconds: 300
///   segment_rate_limit_ms: 100
///   max_segment_chars: 200
///   fallback_tag: "[ずんだもん][ノーマル]"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub voicevox: Option<VoicevoxYaml>,
    pub engine: Option<EngineYaml>,
}

/// Backend connection settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct VoicevoxYaml {
    pub api_url: Option<String>,
    pub http_timeout_seconds: Option<u64>,
    pub catalog_timeout_seconds: Option<u64>,
}

/// Engine tuning from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EngineYaml {
    pub max_parallel_segments: Option<usize>,
    pub segment_timeout_seconds: Option<u64>,
    /// Zero disables pacing
    pub segment_rate_limit_ms: Option<u64>,
    pub max_segment_chars: Option<usize>,
    /// Empty string disables the fallback tag
    pub fallback_tag: Option<String>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
