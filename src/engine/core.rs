// src/engine/core.rs

//! Synchronous bookkeeping of one run.
//!
//! [`RunCore`] owns the effective settings, the unit generator and the
//! [`RunResult`] accumulator. Every terminal attempt goes through
//! [`RunCore::end_attempt`], which updates counters, renders the report
//! fragment, calls `on_test_end` and feeds the retry queue.
//!
//! It has no channels and no timers; the async shell in
//! [`runtime`](crate::engine::runtime) and the scheduler drive it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::options::RunSettings;
use crate::engine::events::{HookError, TestEndEvent, TestResult};
use crate::engine::result::RunResult;
use crate::errors::catch_panic;
use crate::report;
use crate::schedule::{Attempt, UnitGenerator};
use crate::types::{InterruptionCause, Status};

/// How an attempt reached its terminal status.
#[derive(Debug)]
pub enum AttemptEnd {
    /// The body ran (or was cut short); the result is final.
    Ended(TestResult),
    /// The body was never invoked. `on_test_start` still fires, carrying
    /// the status.
    NotStarted(Status),
}

#[derive(Debug)]
pub struct RunCore {
    settings: RunSettings,
    result: RunResult,
    units: UnitGenerator,
}

impl RunCore {
    pub fn new(settings: RunSettings, tests_in_suite: usize, units: UnitGenerator) -> Self {
        let result = RunResult::new(settings.name.clone(), tests_in_suite);
        Self {
            settings,
            result,
            units,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn result(&self) -> &RunResult {
        &self.result
    }

    /// Failed plus timed-out attempts so far.
    pub fn failures(&self) -> usize {
        self.result.counts.failures()
    }

    /// Whether the max-failures breaker should trip.
    pub fn max_failures_reached(&self) -> bool {
        self.settings
            .max_failures
            .is_some_and(|max| self.failures() >= max)
    }

    /// Pull the next attempt from the generator.
    pub fn next_unit(&mut self) -> Option<Attempt> {
        let unit = self.units.next_attempt();
        self.result
            .filter_errors
            .extend(self.units.take_filter_errors());
        unit
    }

    /// Fire `on_test_start`; a failing hook is recorded, never propagated.
    pub fn notify_test_start(&mut self, attempt: &Attempt, status: Option<Status>) {
        let event = attempt.start_event(status);
        let hook = &self.settings.on_test_start;

        if let Err(error) = catch_panic(|| hook(&self.settings, &event)) {
            warn!(test = %event.test.name, error = %error, "on_test_start failed");
            self.result
                .on_test_start_errors
                .push(HookError { error, event });
        }
    }

    /// Record the terminal status of one attempt.
    pub fn end_attempt(&mut self, attempt: Attempt, end: AttemptEnd) {
        let result = match end {
            AttemptEnd::Ended(result) => result,
            AttemptEnd::NotStarted(status) => {
                debug_assert!(status.is_not_started());
                self.notify_test_start(&attempt, Some(status));
                TestResult::not_started(status)
            }
        };

        debug!(
            test = %attempt.test.name,
            repeat_index = attempt.repeat_index,
            retry_index = attempt.retry_index,
            status = %result.status,
            "attempt ended"
        );

        self.result.record(result.status, attempt.test.todo.is_set());

        let fragment = report::test_point(
            self.result.tests_in_run,
            &attempt,
            &result,
            self.settings.oneline_report,
        );
        self.result.report.push_str(&fragment);

        let status = result.status;
        let event = TestEndEvent {
            repeat_index: attempt.repeat_index,
            retry_index: attempt.retry_index,
            result,
            report: fragment,
            test: Arc::clone(&attempt.test),
        };

        let hook = &self.settings.on_test_end;
        if let Err(error) = catch_panic(|| hook(&self.settings, &event)) {
            warn!(test = %event.test.name, error = %error, "on_test_end failed");
            self.result
                .on_test_end_errors
                .push(HookError { error, event });
        }

        self.units.attempt_ended(&attempt, status);
    }

    /// Switch the run status to interrupted. Later failures no longer
    /// change it.
    pub fn mark_interrupted(&mut self, cause: InterruptionCause) {
        self.result.run_status = cause.into();
    }

    /// Report every attempt the generator still holds as not run in time.
    pub fn drain_not_run(&mut self) -> usize {
        let mut drained = 0;
        while let Some(attempt) = self.next_unit() {
            self.end_attempt(attempt, AttemptEnd::NotStarted(Status::WasNotRunInTime));
            drained += 1;
        }
        drained
    }

    /// Render the summary and append it to the report.
    pub fn finish_report(&mut self) {
        let summary = report::summary(
            &self.result.name,
            self.result.run_status,
            &self.result.counts,
            self.result.tests_in_run,
        );
        self.result.report.push_str(&summary);
        self.result.summary = summary;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.result.duration = duration;
    }

    pub fn record_suite_start_error(&mut self, error: anyhow::Error) {
        warn!(error = %error, "on_suite_start failed");
        self.result.on_suite_start_errors.push(error);
    }

    pub fn record_suite_end_error(&mut self, error: anyhow::Error) {
        warn!(error = %error, "on_suite_end failed");
        self.result.on_suite_end_errors.push(error);
    }

    pub fn into_result(self) -> RunResult {
        self.result
    }
}
