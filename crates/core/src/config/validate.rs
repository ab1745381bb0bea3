use super::{types::Config, ConfigError, Environment};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one conversation iteration is allowed
/// - Walking threshold is positive
/// - In production, every required API key is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.openai.max_iterations == 0 {
        return Err(ConfigError::ValidationError(
            "openai.max_iterations must be at least 1".to_string(),
        ));
    }

    if config.maps.walking_threshold_min == 0 {
        return Err(ConfigError::ValidationError(
            "maps.walking_threshold_min must be greater than 0".to_string(),
        ));
    }

    if config.environment == Environment::Production {
        let missing = config.missing_api_keys();
        if !missing.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "missing API keys: {}",
                missing.join(", ")
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys() -> Config {
        let mut config = Config::default();
        config.openai.api_key = "sk-test".to_string();
        config.weather.api_key = "weather".to_string();
        config.maps.api_key = "maps".to_string();
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
        assert!(validate_config(&config_with_keys()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_iterations_fails() {
        let mut config = Config::default();
        config.openai.max_iterations = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_walking_threshold_fails() {
        let mut config = Config::default();
        config.maps.walking_threshold_min = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_production_requires_api_keys() {
        let mut config = Config {
            environment: Environment::Production,
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("openai.api_key"));

        config.openai.api_key = "sk".to_string();
        config.weather.api_key = "w".to_string();
        config.maps.api_key = "m".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_development_tolerates_missing_keys() {
        let config = Config::default();
        assert!(!config.missing_api_keys().is_empty());
        assert!(validate_config(&config).is_ok());
    }
}
