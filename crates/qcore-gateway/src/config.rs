//! Gateway configuration.
//!
//! Supports loading configuration from:
//! 1. A YAML file
//! 2. Environment variables (with `QCORE_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding [`GatewayConfig::base_url`].
pub const ENV_API_URL: &str = "QCORE_API_URL";
/// Environment variable overriding [`GatewayConfig::timeout_seconds`].
pub const ENV_TIMEOUT: &str = "QCORE_TIMEOUT";
/// Environment variable overriding [`GatewayConfig::shots`].
pub const ENV_SHOTS: &str = "QCORE_SHOTS";
/// Environment variable overriding [`GatewayConfig::user_id`].
pub const ENV_USER_ID: &str = "QCORE_USER_ID";

/// How to reach the simulation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Backend root, e.g. `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Shots sent with every simulate request
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// User id sent with exercise submissions
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_shots() -> u32 {
    1024
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            shots: default_shots(),
            user_id: default_user_id(),
        }
    }
}

impl GatewayConfig {
    /// Default configuration pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the shot count.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the submitting user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file without validating its values.
    fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        serde_yaml_ng::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Layer the file (if any) and environment variables, unvalidated.
    ///
    /// Callers with further overrides apply them and then call
    /// [`validate`](Self::validate) once on the final result.
    pub fn resolve(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::parse_file(path)?,
            None => Self::default(),
        };
        Ok(config.merge_env())
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::resolve(config_file)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge process environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge variables from `lookup` into this configuration.
    ///
    /// Only variables that are present override; unparsable numbers are
    /// ignored.
    pub fn merge_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_API_URL) {
            self.base_url = v;
        }
        if let Some(v) = lookup(ENV_TIMEOUT) {
            if let Ok(val) = v.trim().parse() {
                self.timeout_seconds = val;
            }
        }
        if let Some(v) = lookup(ENV_SHOTS) {
            if let Ok(val) = v.trim().parse() {
                self.shots = val;
            }
        }
        if let Some(v) = lookup(ENV_USER_ID) {
            self.user_id = v;
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must start with http:// or https://: {url}"
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.connect_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "connect_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.shots == 0 {
            return Err(ConfigError::ValidationError(
                "shots must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.shots, 1024);
        assert_eq!(config.user_id, "anonymous");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GatewayConfig::new("").validate().is_err());
        assert!(GatewayConfig::new("ftp://example.org").validate().is_err());
        assert!(GatewayConfig::default().with_timeout(0).validate().is_err());
        assert!(GatewayConfig::default().with_shots(0).validate().is_err());
        assert!(GatewayConfig::new("https://quantum.example.org").validate().is_ok());
    }

    #[test]
    fn test_merge_env_overrides() {
        let vars = env(&[
            (ENV_API_URL, "http://sim:9000"),
            (ENV_TIMEOUT, "5"),
            (ENV_SHOTS, "not-a-number"),
        ]);
        let config = GatewayConfig::default().merge_env_from(|k| vars.get(k).cloned());
        assert_eq!(config.base_url, "http://sim:9000");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.shots, 1024);
        assert_eq!(config.user_id, "anonymous");
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://lab.local:8000\nshots: 2048").unwrap();

        let config = GatewayConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://lab.local:8000");
        assert_eq!(config.shots, 2048);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_from_file_errors() {
        let missing = GatewayConfig::from_file("/nonexistent/qcore.yaml");
        assert!(matches!(missing, Err(ConfigError::IoError(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shots: [1, 2").unwrap();
        assert!(matches!(
            GatewayConfig::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shots: 0").unwrap();
        assert!(matches!(
            GatewayConfig::from_file(file.path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_later_layer_repairs_earlier_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: localhost:8000
shots: 16").unwrap();

        let mut config = GatewayConfig::resolve(Some(file.path())).unwrap();
        assert!(config.validate().is_err());

        config.base_url = "http://localhost:8000".into();
        assert!(config.validate().is_ok());
        assert_eq!(config.shots, 16);

        let vars = env(&[(ENV_API_URL, "sim:9000")]);
        let mut config = GatewayConfig::default().merge_env_from(|k| vars.get(k).cloned());
        assert!(config.validate().is_err());
        config.base_url = "https://sim:9000".into();
        assert!(config.validate().is_ok());
    }
}
