//! Configuration validation utilities.

use std::collections::HashSet;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, ServicesConfig, SprigConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &SprigConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_services_config(&config.services)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.output is `file` but logging.file_path is not set",
        ));
    }
    if logging.filters.keys().any(|module| module.trim().is_empty()) {
        return Err(ConfigError::validation(
            "logging.filters keys must be module names",
        ));
    }
    Ok(())
}

fn validate_services_config(services: &ServicesConfig) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for name in &services.root {
        if name.trim().is_empty() {
            return Err(ConfigError::validation("services.root contains an empty name"));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::validation(format!(
                "services.root lists `{name}` more than once"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_config() {
        assert!(validate_config(&SprigConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_duplicate_root_service() {
        let mut config = SprigConfig::default();
        config.services.root = vec!["greeter".into(), "echo".into(), "greeter".into()];

        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_validate_blank_root_service() {
        let mut config = SprigConfig::default();
        config.services.root = vec!["  ".into()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = SprigConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("sprig.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
