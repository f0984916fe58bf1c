//! Layering of defaults, environment and YAML values

use std::time::Duration;

use super::Config;
use super::env::EnvConfig;
use super::yaml::YamlConfig;

/// Build a configuration from environment values with optional YAML overrides
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<Config, Box<dyn std::error::Error>> {
    let env = EnvConfig::load()?;
    Ok(merge(Config::default(), env, yaml.unwrap_or_default()))
}

/// Apply `env` then `yaml` on top of `base`
pub(crate) fn merge(mut config: Config, env: EnvConfig, yaml: YamlConfig) -> Config {
    let voicevox = yaml.voicevox.unwrap_or_default();
    let engine = yaml.engine.unwrap_or_default();

    if let Some(api_url) = voicevox.api_url.or(env.api_url) {
        config.api_url = api_url;
    }
    if let Some(secs) = voicevox.http_timeout_seconds.or(env.http_timeout_seconds) {
        config.http_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = voicevox
        .catalog_timeout_seconds
        .or(env.catalog_timeout_seconds)
    {
        config.catalog_timeout = Duration::from_secs(secs);
    }

    if let Some(n) = engine.max_parallel_segments.or(env.max_parallel_segments) {
        config.engine.max_parallel_segments = n;
    }
    if let Some(secs) = engine
        .segment_timeout_seconds
        .or(env.segment_timeout_seconds)
    {
        config.engine.segment_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = engine.segment_rate_limit_ms.or(env.segment_rate_limit_ms) {
        config.engine.segment_rate_limit = Duration::from_millis(ms);
    }
    if let Some(chars) = engine.max_segment_chars.or(env.max_segment_chars) {
        config.engine.max_segment_chars = chars;
    }
    if let Some(tag) = engine.fallback_tag.or(env.fallback_tag) {
        config.engine.fallback_tag = tag.trim().to_string();
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::yaml::{EngineYaml, VoicevoxYaml};

    #[test]
    fn test_defaults_survive_empty_sources() {
        let config = merge(Config::default(), EnvConfig::default(), YamlConfig::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_yaml_beats_env() {
        let env = EnvConfig {
            api_url: Some("http://env:50021".to_string()),
            max_parallel_segments: Some(2),
            max_segment_chars: Some(80),
            ..Default::default()
        };
        let yaml = YamlConfig {
            voicevox: Some(VoicevoxYaml {
                api_url: Some("http://yaml:50021".to_string()),
                ..Default::default()
            }),
            engine: Some(EngineYaml {
                max_parallel_segments: Some(9),
                ..Default::default()
            }),
        };

        let config = merge(Config::default(), env, yaml);

        assert_eq!(config.api_url, "http://yaml:50021");
        assert_eq!(config.engine.max_parallel_segments, 9);
        // env value used where YAML is silent
        assert_eq!(config.engine.max_segment_chars, 80);
    }

    #[test]
    fn test_empty_fallback_tag_disables_fallback() {
        let env = EnvConfig {
            fallback_tag: Some("  ".to_string()),
            ..Default::default()
        };

        let config = merge(Config::default(), env, YamlConfig::default());
        assert_eq!(config.engine.fallback_tag, "");
    }

    #[test]
    fn test_durations_are_converted() {
        let env = EnvConfig {
            http_timeout_seconds: Some(15),
            segment_rate_limit_ms: Some(250),
            ..Default::default()
        };

        let config = merge(Config::default(), env, YamlConfig::default());
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.engine.segment_rate_limit, Duration::from_millis(250));
    }
}
