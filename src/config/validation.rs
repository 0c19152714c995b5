use super::{AppConfig, ConfigError};

/// Validate the full application config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_log_level(config)?;
    validate_tracing(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_log_level(config: &AppConfig) -> Result<(), ConfigError> {
    let valid_levels = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL", "DISABLED"];
    if !valid_levels.contains(&config.features.log_level.to_uppercase().as_str()) {
        return Err(validation_err(format!(
            "log_level must be one of {valid_levels:?}"
        )));
    }
    Ok(())
}

fn validate_tracing(config: &AppConfig) -> Result<(), ConfigError> {
    if config.tracing.base64_image_max_length == 0 {
        return Err(validation_err(
            "tracing.base64_image_max_length must be greater than 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = AppConfig::default();
        for level in ["debug", "Warning", "critical", "DISABLED"] {
            config.features.log_level = level.to_string();
            assert!(
                validate_config(&config).is_ok(),
                "Level '{level}' should be valid"
            );
        }
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.features.log_level = "VERBOSE".to_string();
        let msg = validate_config(&config).unwrap_err().to_string();
        assert!(msg.starts_with("Config validation error: log_level"), "{msg}");
    }

    #[test]
    fn test_zero_image_length() {
        let mut config = AppConfig::default();
        config.tracing.base64_image_max_length = 0;
        assert!(validate_config(&config).is_err());
    }
}
