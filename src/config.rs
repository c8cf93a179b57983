//! Dispatcher configuration
//!
//! Loaded from YAML, with a few environment overrides:
//!
//! ```yaml
//! late_completion: deliver   # deliver | suppress | abort
//! default_status: active
//! retry:
//!   max_transient_retries: 0
//!   backoff_ms: 250
//! ```
//!
//! Missing keys take the defaults shown.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Path to the YAML config
pub const CONFIG_PATH_ENV: &str = "CARE_RECORDS_CONFIG";
/// Overrides `late_completion`
pub const LATE_COMPLETION_ENV: &str = "CARE_RECORDS_LATE_COMPLETION";
/// Overrides `retry.max_transient_retries`
pub const MAX_RETRIES_ENV: &str = "CARE_RECORDS_MAX_RETRIES";

/// What happens when a save resolves after the user already closed its dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateCompletionPolicy {
    /// Apply flag changes and notify as if the dialog were still open
    #[default]
    Deliver,
    /// Log the result, but leave flags alone and emit no notification
    Suppress,
    /// Drop the in-flight port call as soon as the dialog closes
    Abort,
}

impl LateCompletionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deliver => "deliver",
            Self::Suppress => "suppress",
            Self::Abort => "abort",
        }
    }
}

impl FromStr for LateCompletionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deliver" => Ok(Self::Deliver),
            "suppress" => Ok(Self::Suppress),
            "abort" => Ok(Self::Abort),
            _ => Err(ConfigError::InvalidValue {
                key: "late_completion".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Retry of transient port failures. Zero retries means none.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_transient_retries: u32,
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_transient_retries: 0,
            backoff_ms: 250,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub late_completion: LateCompletionPolicy,
    /// `status` filled into new records that carry one
    pub default_status: String,
    pub retry: RetryConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            late_completion: LateCompletionPolicy::default(),
            default_status: "active".to_string(),
            retry: RetryConfig::default(),
        }
    }
}

impl DispatcherConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Load `.env`, then the YAML file named by `CARE_RECORDS_CONFIG` (if
    /// any), then apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }

        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::info!(path = %path, "Loading dispatcher configuration");
                Self::from_file(&path)?
            }
            Err(_) => Self::default(),
        };

        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (the environment, in production)
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(LATE_COMPLETION_ENV) {
            self.late_completion = value.parse()?;
        }
        if let Some(value) = lookup(MAX_RETRIES_ENV) {
            self.retry.max_transient_retries =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: MAX_RETRIES_ENV.to_string(),
                    value: value.clone(),
                })?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_do_not_retry_or_suppress() {
        let config = DispatcherConfig::default();
        assert_eq!(config.late_completion, LateCompletionPolicy::Deliver);
        assert_eq!(config.retry.max_transient_retries, 0);
        assert_eq!(config.default_status, "active");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = DispatcherConfig::from_yaml_str("late_completion: suppress\n").unwrap();
        assert_eq!(config.late_completion, LateCompletionPolicy::Suppress);
        assert_eq!(config.retry, RetryConfig::default());

        let config =
            DispatcherConfig::from_yaml_str("retry:\n  max_transient_retries: 2\n").unwrap();
        assert_eq!(config.retry.max_transient_retries, 2);
        assert_eq!(config.retry.backoff_ms, 250);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            DispatcherConfig::from_yaml_str("  \n").unwrap(),
            DispatcherConfig::default()
        );
    }

    #[test]
    fn test_bad_policy_rejected() {
        let err = DispatcherConfig::from_yaml_str("late_completion: ignore\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "late_completion: abort\ndefault_status: open\nretry:\n  max_transient_retries: 1\n  backoff_ms: 10"
        )
        .unwrap();

        let config = DispatcherConfig::from_file(file.path()).unwrap();
        assert_eq!(config.late_completion, LateCompletionPolicy::Abort);
        assert_eq!(config.default_status, "open");
        assert_eq!(config.retry.backoff(), Duration::from_millis(10));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DispatcherConfig::from_file(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (LATE_COMPLETION_ENV, "Suppress"),
            (MAX_RETRIES_ENV, "3"),
        ]
        .into_iter()
        .collect();

        let config = DispatcherConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.late_completion, LateCompletionPolicy::Suppress);
        assert_eq!(config.retry.max_transient_retries, 3);
    }

    #[test]
    fn test_bad_override_rejected() {
        let err = DispatcherConfig::default()
            .with_overrides(|k| (k == MAX_RETRIES_ENV).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
