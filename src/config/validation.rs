//! Post-merge configuration checks

use std::time::Duration;

use crate::core::engine::EngineConfig;
use crate::utils::validate_api_url;

/// Validate the backend URL
pub fn validate_api_url_setting(api_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    validate_api_url(api_url).map_err(|e| format!("Invalid VOICEVOX API URL '{api_url}': {e}"))?;
    Ok(())
}

/// Validate a timeout is non-zero
pub fn validate_timeout(name: &str, timeout: Duration) -> Result<(), Box<dyn std::error::Error>> {
    if timeout.is_zero() {
        return Err(format!("{name} must be greater than 0").into());
    }
    Ok(())
}

/// Validate engine tuning values
pub fn validate_engine(engine: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    engine.validate()?;
    Ok(())
}
