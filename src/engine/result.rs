// src/engine/result.rs

//! Aggregate result of one run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::events::{FilterError, TestEndError, TestStartError};
use crate::report;
use crate::types::{RunStatus, Status};

/// One counter per [`Status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub failed: usize,
    pub has_no_body: usize,
    pub interrupted: usize,
    pub passed: usize,
    pub skipped: usize,
    pub timed_out: usize,
    pub was_not_run_in_time: usize,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> usize {
        match status {
            Status::Failed => self.failed,
            Status::HasNoBody => self.has_no_body,
            Status::Interrupted => self.interrupted,
            Status::Passed => self.passed,
            Status::Skipped => self.skipped,
            Status::TimedOut => self.timed_out,
            Status::WasNotRunInTime => self.was_not_run_in_time,
        }
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Failed => &mut self.failed,
            Status::HasNoBody => &mut self.has_no_body,
            Status::Interrupted => &mut self.interrupted,
            Status::Passed => &mut self.passed,
            Status::Skipped => &mut self.skipped,
            Status::TimedOut => &mut self.timed_out,
            Status::WasNotRunInTime => &mut self.was_not_run_in_time,
        }
    }

    pub fn increment(&mut self, status: Status) {
        *self.slot(status) += 1;
    }

    pub fn total(&self) -> usize {
        Status::ALL.into_iter().map(|status| self.get(status)).sum()
    }

    /// Attempts that count against `max_failures`.
    pub fn failures(&self) -> usize {
        self.failed + self.timed_out
    }
}

/// Everything a run produced.
///
/// Invariant: `counts.total() == tests_in_run`.
#[derive(Debug)]
pub struct RunResult {
    pub name: String,
    pub run_status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
    /// Declared tests, whether or not they were selected.
    pub tests_in_suite: usize,
    /// Attempts that reached a terminal status.
    pub tests_in_run: usize,
    pub counts: StatusCounts,
    /// Full report: every test point, then the summary.
    pub report: String,
    /// Bail-out line (if interrupted) and plan line.
    pub summary: String,
    pub filter_errors: Vec<FilterError>,
    pub on_suite_start_errors: Vec<anyhow::Error>,
    pub on_suite_end_errors: Vec<anyhow::Error>,
    pub on_test_start_errors: Vec<TestStartError>,
    pub on_test_end_errors: Vec<TestEndError>,
}

impl RunResult {
    pub(crate) fn new(name: String, tests_in_suite: usize) -> Self {
        let summary = report::unfinished_summary(&name);
        Self {
            name,
            run_status: RunStatus::Passed,
            start_time: Utc::now(),
            duration: Duration::ZERO,
            tests_in_suite,
            tests_in_run: 0,
            counts: StatusCounts::default(),
            report: String::new(),
            summary,
            filter_errors: Vec::new(),
            on_suite_start_errors: Vec::new(),
            on_suite_end_errors: Vec::new(),
            on_test_start_errors: Vec::new(),
            on_test_end_errors: Vec::new(),
        }
    }

    pub fn count(&self, status: Status) -> usize {
        self.counts.get(status)
    }

    /// Total number of hook and filter errors collected during the run.
    pub fn error_count(&self) -> usize {
        self.filter_errors.len()
            + self.on_suite_start_errors.len()
            + self.on_suite_end_errors.len()
            + self.on_test_start_errors.len()
            + self.on_test_end_errors.len()
    }

    /// Count one terminal attempt. A failure of a non-todo test flips a
    /// still-passing run to failed.
    pub(crate) fn record(&mut self, status: Status, is_todo: bool) {
        if status.is_failure() && !is_todo && self.run_status == RunStatus::Passed {
            self.run_status = RunStatus::Failed;
        }
        self.counts.increment(status);
        self.tests_in_run += 1;
    }
}
