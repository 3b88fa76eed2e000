//! Configuration loading and validation for the icmpmonitor daemon.

use monitor::HostConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hosts to monitor
    pub hosts: Vec<HostConfig>,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::Invalid("no hosts defined".to_string()));
        }

        for host in &self.hosts {
            if host.host.is_empty() {
                return Err(ConfigError::Invalid("empty host name".to_string()));
            }
            validate_seconds(&host.host, "ping_interval", host.ping_interval)?;
            validate_seconds(&host.host, "max_delay", host.max_delay)?;
        }

        Ok(())
    }
}

/// Intervals are whole positive seconds; the scheduler tick is derived
/// from their GCD in seconds.
fn validate_seconds(
    host: &str,
    field: &str,
    value: std::time::Duration,
) -> Result<(), ConfigError> {
    if value.as_secs() == 0 || value.subsec_nanos() != 0 {
        return Err(ConfigError::Invalid(format!(
            "host {host}: {field} must be a positive whole number of seconds"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor::StartCondition;
    use std::time::Duration;

    const SAMPLE: &str = r#"
hosts:
  - host: gw.example.net
    ping_interval: 2s
    max_delay: 10s
    up_command: "logger gw up"
    down_command: "logger gw down"
  - host: 192.168.1.1
    ping_interval: 5s
    max_delay: 30s
    up_command: "true"
    down_command: "false"
    start_condition: down
logging:
  level: debug
"#;

    fn parse(raw: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_str(raw).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_parse_sample() {
        let config = parse(SAMPLE).unwrap();
        assert_eq!(config.hosts.len(), 2);

        let gw = &config.hosts[0];
        assert_eq!(gw.host, "gw.example.net");
        assert_eq!(gw.ping_interval, Duration::from_secs(2));
        assert_eq!(gw.max_delay, Duration::from_secs(10));
        assert_eq!(gw.start_condition, StartCondition::Up);

        assert_eq!(config.hosts[1].start_condition, StartCondition::Down);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_no_hosts_rejected() {
        assert!(parse("hosts: []").is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let raw = r#"
hosts:
  - host: gw
    ping_interval: 0s
    max_delay: 10s
    up_command: "true"
    down_command: "true"
"#;
        assert!(parse(raw).is_err());
    }

    #[test]
    fn test_fractional_interval_rejected() {
        let raw = r#"
hosts:
  - host: gw
    ping_interval: 1500ms
    max_delay: 10s
    up_command: "true"
    down_command: "true"
"#;
        assert!(parse(raw).is_err());
    }

    #[test]
    fn test_unknown_start_condition_rejected() {
        // Historical "auto" and "none" modes are not supported.
        let raw = r#"
hosts:
  - host: gw
    ping_interval: 2s
    max_delay: 10s
    up_command: "true"
    down_command: "true"
    start_condition: auto
"#;
        assert!(parse(raw).is_err());
    }
}
