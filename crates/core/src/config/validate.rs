use super::{
    types::{Config, MAX_CONCURRENT_COUNT, MIN_CONCURRENT_COUNT},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - general.max_concurrent_count is within 1..=20
/// - intro_skip.fingerprint_minutes is within 1..=20
/// - extractor.timeout_secs is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    validate_concurrent_count(config.general.max_concurrent_count)?;

    if !(1..=20).contains(&config.intro_skip.fingerprint_minutes) {
        return Err(ConfigError::ValidationError(format!(
            "intro_skip.fingerprint_minutes must be between 1 and 20, got {}",
            config.intro_skip.fingerprint_minutes
        )));
    }

    if config.extractor.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "extractor.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// Checks a concurrency limit against the accepted range.
pub fn validate_concurrent_count(count: usize) -> Result<(), ConfigError> {
    if !(MIN_CONCURRENT_COUNT..=MAX_CONCURRENT_COUNT).contains(&count) {
        return Err(ConfigError::ValidationError(format!(
            "general.max_concurrent_count must be between {} and {}, got {}",
            MIN_CONCURRENT_COUNT, MAX_CONCURRENT_COUNT, count
        )));
    }
    Ok(())
}
