// src/config/validate.rs

use crate::config::model::{RawSuiteConfig, SuiteConfig};
use crate::errors::{Result, SuiteError};

impl TryFrom<RawSuiteConfig> for SuiteConfig {
    type Error = SuiteError;

    fn try_from(raw: RawSuiteConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(SuiteConfig::from_raw_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawSuiteConfig) -> Result<()> {
    ensure_nonzero("concurrency", cfg.concurrency.map(|v| v as u64))?;
    ensure_nonzero("repeats", cfg.repeats.map(|v| v as u64))?;
    ensure_nonzero("test_timeout_ms", cfg.test_timeout_ms)?;
    ensure_nonzero("run_timeout_ms", cfg.run_timeout_ms)?;

    if let Some(name) = &cfg.name {
        if name.trim().is_empty() {
            return Err(SuiteError::ConfigError(
                "name must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn ensure_nonzero(key: &str, value: Option<u64>) -> Result<()> {
    match value {
        Some(0) => Err(SuiteError::ConfigError(format!(
            "{key} must be >= 1 (got 0)"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn empty_raw_config_gives_defaults() {
        let cfg = SuiteConfig::try_from(RawSuiteConfig::default()).unwrap();
        assert_eq!(cfg, SuiteConfig::default());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let raw = RawSuiteConfig {
            concurrency: Some(0),
            ..RawSuiteConfig::default()
        };

        match SuiteConfig::try_from(raw) {
            Err(SuiteError::ConfigError(msg)) => assert!(msg.contains("concurrency")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let raw = RawSuiteConfig {
            test_timeout_ms: Some(0),
            ..RawSuiteConfig::default()
        };
        assert!(SuiteConfig::try_from(raw).is_err());
    }

    #[test]
    fn millisecond_fields_become_durations() {
        let raw = RawSuiteConfig {
            test_timeout_ms: Some(250),
            run_timeout_ms: Some(1_000),
            max_failures: Some(3),
            ..RawSuiteConfig::default()
        };

        let cfg = SuiteConfig::try_from(raw).unwrap();
        assert_eq!(cfg.test_timeout, Duration::from_millis(250));
        assert_eq!(cfg.run_timeout, Duration::from_secs(1));
        assert_eq!(cfg.max_failures, Some(3));
    }
}
