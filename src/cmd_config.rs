//! `config-check` subcommand.

use pagepilot_config::{Config, ConfigValidator};

pub(crate) fn run_config_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if result.is_valid() {
        println!("Configuration OK ({} warning(s))", result.warnings.len());
        Ok(())
    } else {
        Err(format!("configuration has {} error(s)", result.errors.len()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepilot_config::ConfigLoader;

    #[test]
    fn test_default_config_passes() {
        assert!(run_config_check(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_attempts_fails() {
        let config = ConfigLoader::load_str("[actions.retry]\nmax_attempts = 0\n").unwrap();
        assert!(run_config_check(&config).is_err());
    }
}
