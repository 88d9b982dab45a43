use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,
}

/// Service configuration. The OTM endpoint itself is configured through the
/// environment, not this file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for the inbound API
    pub listener: Listener,
    /// Optional statsd target for metrics export
    pub metrics: Option<MetricsConfig>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listener: Listener {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            metrics: None,
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");
        tmp
    }

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
listener:
    host: "0.0.0.0"
    port: 8000
metrics:
    statsd_host: "127.0.0.1"
    statsd_port: 8125
"#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");
        assert!(config.validate().is_ok());
        assert_eq!(config.listener.port, 8000);
        assert_eq!(
            config.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".to_string(),
                statsd_port: 8125,
            })
        );
    }

    #[test]
    fn test_metrics_section_is_optional() {
        let tmp = write_tmp_file("listener: {host: \"127.0.0.1\", port: 9000}\n");
        let config = Config::from_file(tmp.path()).expect("load config");
        assert_eq!(config.metrics, None);
    }

    #[test]
    fn test_validation_rejects_port_zero() {
        let mut config = Config::default();
        config.listener.port = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ValidationError::InvalidPort
        ));
    }

    #[test]
    fn test_deserialization_errors() {
        // Missing required field
        assert!(serde_yaml::from_str::<Config>("metrics: null").is_err());

        // Invalid port type
        assert!(
            serde_yaml::from_str::<Config>(
                r#"
listener: {host: "0.0.0.0", port: "not_a_number"}
"#
            )
            .is_err()
        );
    }
}
