//! Environment variable loading

use std::env;
use std::str::FromStr;

pub const API_URL: &str = "VOICEVOX_API_URL";
pub const HTTP_TIMEOUT_SECONDS: &str = "VOICEVOX_HTTP_TIMEOUT_SECONDS";
pub const CATALOG_TIMEOUT_SECONDS: &str = "VOICEVOX_CATALOG_TIMEOUT_SECONDS";
pub const MAX_PARALLEL_SEGMENTS: &str = "MAX_PARALLEL_SEGMENTS";
pub const SEGMENT_TIMEOUT_SECONDS: &str = "SEGMENT_TIMEOUT_SECONDS";
pub const SEGMENT_RATE_LIMIT_MS: &str = "SEGMENT_RATE_LIMIT_MS";
pub const MAX_SEGMENT_CHARS: &str = "MAX_SEGMENT_CHARS";
pub const FALLBACK_TAG: &str = "FALLBACK_TAG";

/// Every variable this crate reads
pub const ALL_VARS: [&str; 8] = [
    API_URL,
    HTTP_TIMEOUT_SECONDS,
    CATALOG_TIMEOUT_SECONDS,
    MAX_PARALLEL_SEGMENTS,
    SEGMENT_TIMEOUT_SECONDS,
    SEGMENT_RATE_LIMIT_MS,
    MAX_SEGMENT_CHARS,
    FALLBACK_TAG,
];

/// Raw values read from the environment; unset variables stay `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_url: Option<String>,
    pub http_timeout_seconds: Option<u64>,
    pub catalog_timeout_seconds: Option<u64>,
    pub max_parallel_segments: Option<usize>,
    pub segment_timeout_seconds: Option<u64>,
    pub segment_rate_limit_ms: Option<u64>,
    pub max_segment_chars: Option<usize>,
    pub fallback_tag: Option<String>,
}

impl EnvConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            api_url: string_var(API_URL),
            http_timeout_seconds: parse_var(HTTP_TIMEOUT_SECONDS)?,
            catalog_timeout_seconds: parse_var(CATALOG_TIMEOUT_SECONDS)?,
            max_parallel_segments: parse_var(MAX_PARALLEL_SEGMENTS)?,
            segment_timeout_seconds: parse_var(SEGMENT_TIMEOUT_SECONDS)?,
            segment_rate_limit_ms: parse_var(SEGMENT_RATE_LIMIT_MS)?,
            max_segment_chars: parse_var(MAX_SEGMENT_CHARS)?,
            // An empty FALLBACK_TAG is meaningful: it disables the fallback
            fallback_tag: env::var(FALLBACK_TAG).ok(),
        })
    }
}

/// Non-empty trimmed value of `name`
fn string_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match string_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: {e}").into()),
        None => Ok(None),
    }
}
