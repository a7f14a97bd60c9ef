//! Runtime configuration.
//!
//! Loaded from a TOML file, then overridden field by field from `FOH_*` environment
//! variables. Every field has a default, so an empty file (or no file) is valid.
//!
//! ```toml
//! max_tables = 16
//! sweep_delay_secs = 30
//! ```

use row_store::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    #[error("Config validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontOfHouseConfig {
    /// Tables are numbered 1..=max_tables.
    pub max_tables: u32,
    /// Delay before the start-up sweep assigns seated tables nobody owns.
    pub sweep_delay_secs: u64,
    /// Request buffer of every actor.
    pub channel_capacity: usize,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for FrontOfHouseConfig {
    fn default() -> Self {
        Self {
            max_tables: 12,
            sweep_delay_secs: 30,
            channel_capacity: 32,
            retry_attempts: 3,
            retry_backoff_ms: 50,
        }
    }
}

impl FrontOfHouseConfig {
    pub fn sweep_delay(&self) -> Duration {
        Duration::from_secs(self.sweep_delay_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.retry_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn from_toml(content: &str) -> Result<FrontOfHouseConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_file(path: &Path) -> Result<FrontOfHouseConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Applies `FOH_*` overrides from `vars`. Unrelated variables are ignored.
    pub fn apply_overrides<I, K, V>(mut config: FrontOfHouseConfig, vars: I) -> Result<FrontOfHouseConfig>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (var, value) in vars {
            let (var, value) = (var.as_ref(), value.as_ref());
            match var {
                "FOH_MAX_TABLES" => config.max_tables = parse(var, value)?,
                "FOH_SWEEP_DELAY_SECS" => config.sweep_delay_secs = parse(var, value)?,
                "FOH_CHANNEL_CAPACITY" => config.channel_capacity = parse(var, value)?,
                "FOH_RETRY_ATTEMPTS" => config.retry_attempts = parse(var, value)?,
                "FOH_RETRY_BACKOFF_MS" => config.retry_backoff_ms = parse(var, value)?,
                _ => continue,
            }
            debug!(var, value, "Config override");
        }
        Ok(config)
    }

    /// Defaults plus the process environment.
    pub fn from_env() -> Result<FrontOfHouseConfig> {
        Self::apply_overrides(FrontOfHouseConfig::default(), std::env::vars())
    }

    /// The file (if any), then the environment, then validation.
    pub fn load(path: Option<&Path>) -> Result<FrontOfHouseConfig> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => FrontOfHouseConfig::default(),
        };
        let config = Self::apply_overrides(base, std::env::vars())?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &FrontOfHouseConfig) -> Result<()> {
        if config.max_tables == 0 {
            return Err(ConfigError::Validation("max_tables must be at least 1".into()));
        }
        if config.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "channel_capacity must be at least 1".into(),
            ));
        }
        if config.retry_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(var: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConfigLoader::from_toml("max_tables = 20\nretry_backoff_ms = 5").unwrap();
        assert_eq!(config.max_tables, 20);
        assert_eq!(config.retry_policy().backoff, Duration::from_millis(5));
        assert_eq!(config.sweep_delay(), Duration::from_secs(30));
        assert_eq!(config.channel_capacity, 32);
    }

    #[test]
    fn test_env_overrides_file() {
        let config = ConfigLoader::from_toml("max_tables = 20").unwrap();
        let config = ConfigLoader::apply_overrides(
            config,
            [("FOH_MAX_TABLES", "8"), ("PATH", "/bin"), ("FOH_SWEEP_DELAY_SECS", " 1 ")],
        )
        .unwrap();
        assert_eq!(config.max_tables, 8);
        assert_eq!(config.sweep_delay_secs, 1);
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let err = ConfigLoader::apply_overrides(
            FrontOfHouseConfig::default(),
            [("FOH_RETRY_ATTEMPTS", "many")],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == "FOH_RETRY_ATTEMPTS"));
    }

    #[test]
    fn test_validation() {
        assert!(ConfigLoader::validate(&FrontOfHouseConfig::default()).is_ok());
        let config = FrontOfHouseConfig {
            max_tables: 0,
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("foh-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "channel_capacity = 4").unwrap();
        drop(file);

        let config = ConfigLoader::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.channel_capacity, 4);

        assert!(matches!(
            ConfigLoader::from_file(&path),
            Err(ConfigError::Io(_))
        ));
    }
}
