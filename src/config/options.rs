// src/config/options.rs

//! Per-run overrides and the effective settings a run works with.
//!
//! Precedence for every scalar: run option > suite configuration. Hooks,
//! the filter predicate and `print` follow the same rule, with the built-in
//! TAP printing hooks as the last fallback.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::model::SuiteConfig;
use crate::engine::events::{TestEndEvent, TestStartEvent};
use crate::engine::result::RunResult;
use crate::suite::declare::Outcome;
use crate::suite::resolve::{ResolvedTest, TestDefaults};

pub type FilterFn = Arc<dyn Fn(&ResolvedTest) -> anyhow::Result<bool> + Send + Sync>;
pub type SuiteStartHook = Arc<dyn Fn(&RunSettings) -> Outcome + Send + Sync>;
pub type SuiteEndHook = Arc<dyn Fn(&RunSettings, &RunResult) -> Outcome + Send + Sync>;
pub type TestStartHook =
    Arc<dyn Fn(&RunSettings, &TestStartEvent) -> anyhow::Result<()> + Send + Sync>;
pub type TestEndHook =
    Arc<dyn Fn(&RunSettings, &TestEndEvent) -> anyhow::Result<()> + Send + Sync>;
pub type PrintFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional callbacks. Set on a suite as its defaults, or on [`RunOptions`]
/// to override them for a single run.
#[derive(Clone, Default)]
pub struct Hooks {
    pub filter: Option<FilterFn>,
    pub on_suite_start: Option<SuiteStartHook>,
    pub on_suite_end: Option<SuiteEndHook>,
    pub on_test_start: Option<TestStartHook>,
    pub on_test_end: Option<TestEndHook>,
    pub print: Option<PrintFn>,
}

impl Hooks {
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResolvedTest) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(f));
        self
    }

    pub fn on_suite_start<F>(mut self, f: F) -> Self
    where
        F: Fn(&RunSettings) -> Outcome + Send + Sync + 'static,
    {
        self.on_suite_start = Some(Arc::new(f));
        self
    }

    pub fn on_suite_end<F>(mut self, f: F) -> Self
    where
        F: Fn(&RunSettings, &RunResult) -> Outcome + Send + Sync + 'static,
    {
        self.on_suite_end = Some(Arc::new(f));
        self
    }

    pub fn on_test_start<F>(mut self, f: F) -> Self
    where
        F: Fn(&RunSettings, &TestStartEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_test_start = Some(Arc::new(f));
        self
    }

    pub fn on_test_end<F>(mut self, f: F) -> Self
    where
        F: Fn(&RunSettings, &TestEndEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_test_end = Some(Arc::new(f));
        self
    }

    pub fn print<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.print = Some(Arc::new(f));
        self
    }

    /// Fields set on `self` win; the rest come from `fallback`.
    fn or(self, fallback: &Hooks) -> Hooks {
        Hooks {
            filter: self.filter.or_else(|| fallback.filter.clone()),
            on_suite_start: self
                .on_suite_start
                .or_else(|| fallback.on_suite_start.clone()),
            on_suite_end: self.on_suite_end.or_else(|| fallback.on_suite_end.clone()),
            on_test_start: self
                .on_test_start
                .or_else(|| fallback.on_test_start.clone()),
            on_test_end: self.on_test_end.or_else(|| fallback.on_test_end.clone()),
            print: self.print.or_else(|| fallback.print.clone()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("filter", &self.filter.is_some())
            .field("on_suite_start", &self.on_suite_start.is_some())
            .field("on_suite_end", &self.on_suite_end.is_some())
            .field("on_test_start", &self.on_test_start.is_some())
            .field("on_test_end", &self.on_test_end.is_some())
            .field("print", &self.print.is_some())
            .finish()
    }
}

/// Overrides for a single run. Everything is optional.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub name: Option<String>,
    pub concurrency: Option<usize>,
    pub max_failures: Option<usize>,
    pub repeats: Option<usize>,
    pub retries: Option<usize>,
    pub test_timeout: Option<Duration>,
    pub run_timeout: Option<Duration>,
    pub oneline_report: Option<bool>,
    /// External cancellation; cancelling it interrupts the run.
    pub signal: Option<CancellationToken>,
    pub hooks: Hooks,
}

impl RunOptions {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn max_failures(mut self, max_failures: usize) -> Self {
        self.max_failures = Some(max_failures);
        self
    }

    pub fn repeats(mut self, repeats: usize) -> Self {
        self.repeats = Some(repeats);
        self
    }

    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = Some(timeout);
        self
    }

    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    pub fn oneline_report(mut self, oneline: bool) -> Self {
        self.oneline_report = Some(oneline);
        self
    }

    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Effective settings of one run: run options layered over the suite.
///
/// Hooks receive a reference to this.
#[derive(Clone)]
pub struct RunSettings {
    pub name: String,
    pub concurrency: usize,
    pub max_failures: Option<usize>,
    pub test_defaults: TestDefaults,
    pub run_timeout: Duration,
    pub oneline_report: bool,
    pub signal: Option<CancellationToken>,
    pub filter: Option<FilterFn>,
    pub on_suite_start: SuiteStartHook,
    pub on_suite_end: SuiteEndHook,
    pub on_test_start: TestStartHook,
    pub on_test_end: TestEndHook,
    pub print: PrintFn,
}

impl RunSettings {
    pub fn resolve(config: &SuiteConfig, suite_hooks: &Hooks, options: RunOptions) -> Self {
        let RunOptions {
            name,
            concurrency,
            max_failures,
            repeats,
            retries,
            test_timeout,
            run_timeout,
            oneline_report,
            signal,
            hooks,
        } = options;

        let mut concurrency = concurrency.unwrap_or(config.concurrency);
        if concurrency == 0 {
            warn!("concurrency of 0 requested; clamping to 1");
            concurrency = 1;
        }

        let hooks = hooks.or(suite_hooks);

        Self {
            name: name.unwrap_or_else(|| config.name.clone()),
            concurrency,
            max_failures: max_failures.or(config.max_failures),
            test_defaults: TestDefaults {
                repeats: repeats.unwrap_or(config.repeats).max(1),
                retries: retries.unwrap_or(config.retries),
                timeout: test_timeout.unwrap_or(config.test_timeout),
            },
            run_timeout: run_timeout.unwrap_or(config.run_timeout),
            oneline_report: oneline_report.unwrap_or(config.oneline_report),
            signal,
            filter: hooks.filter,
            on_suite_start: hooks
                .on_suite_start
                .unwrap_or_else(|| Arc::new(print_tap_header)),
            on_suite_end: hooks.on_suite_end.unwrap_or_else(|| Arc::new(print_summary)),
            on_test_start: hooks
                .on_test_start
                .unwrap_or_else(|| Arc::new(ignore_test_start)),
            on_test_end: hooks
                .on_test_end
                .unwrap_or_else(|| Arc::new(print_test_report)),
            print: hooks.print.unwrap_or_else(|| Arc::new(print_stdout)),
        }
    }
}

impl fmt::Debug for RunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunSettings")
            .field("name", &self.name)
            .field("concurrency", &self.concurrency)
            .field("max_failures", &self.max_failures)
            .field("test_defaults", &self.test_defaults)
            .field("run_timeout", &self.run_timeout)
            .field("oneline_report", &self.oneline_report)
            .field("signal", &self.signal.is_some())
            .field("filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

fn print_tap_header(settings: &RunSettings) -> Outcome {
    (settings.print)("TAP version 14\n");
    Outcome::ok()
}

fn print_summary(settings: &RunSettings, result: &RunResult) -> Outcome {
    (settings.print)(&result.summary);
    Outcome::ok()
}

fn ignore_test_start(_settings: &RunSettings, _event: &TestStartEvent) -> anyhow::Result<()> {
    Ok(())
}

fn print_test_report(settings: &RunSettings, event: &TestEndEvent) -> anyhow::Result<()> {
    if !event.report.is_empty() {
        (settings.print)(&event.report);
    }
    Ok(())
}

fn print_stdout(text: &str) {
    print!("{text}");
}
