// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::suite::resolve::ANONYMOUS;

/// Suite configuration as read from a TOML file.
///
/// ```toml
/// name = "parser suite"
/// concurrency = 4
/// max_failures = 10
/// repeats = 1
/// retries = 2
/// test_timeout_ms = 5000
/// run_timeout_ms = 60000
/// oneline_report = true
/// ```
///
/// Every key is optional; see [`SuiteConfig`] for the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSuiteConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Stop the run once this many attempts failed or timed out.
    #[serde(default)]
    pub max_failures: Option<usize>,

    #[serde(default)]
    pub repeats: Option<usize>,

    #[serde(default)]
    pub retries: Option<usize>,

    #[serde(default)]
    pub test_timeout_ms: Option<u64>,

    #[serde(default)]
    pub run_timeout_ms: Option<u64>,

    /// Only print the test-point line for passing attempts.
    #[serde(default)]
    pub oneline_report: Option<bool>,
}

/// Validated suite-level defaults, shared read-only by every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    pub name: String,
    pub concurrency: usize,
    /// `None` means unbounded.
    pub max_failures: Option<usize>,
    pub repeats: usize,
    pub retries: usize,
    pub test_timeout: Duration,
    pub run_timeout: Duration,
    pub oneline_report: bool,
}

pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            name: ANONYMOUS.to_string(),
            concurrency: 1,
            max_failures: None,
            repeats: 1,
            retries: 0,
            test_timeout: DEFAULT_TEST_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
            oneline_report: false,
        }
    }
}

impl SuiteConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Fill unset raw values with defaults without validating them.
    pub(crate) fn from_raw_unchecked(raw: RawSuiteConfig) -> Self {
        let defaults = Self::default();
        Self {
            name: raw.name.unwrap_or(defaults.name),
            concurrency: raw.concurrency.unwrap_or(defaults.concurrency),
            max_failures: raw.max_failures,
            repeats: raw.repeats.unwrap_or(defaults.repeats),
            retries: raw.retries.unwrap_or(defaults.retries),
            test_timeout: raw
                .test_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.test_timeout),
            run_timeout: raw
                .run_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.run_timeout),
            oneline_report: raw.oneline_report.unwrap_or(defaults.oneline_report),
        }
    }
}
