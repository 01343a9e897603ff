// src/engine/events.rs

//! Records handed to the per-test hooks and kept in the error lists.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::suite::resolve::ResolvedTest;
use crate::types::Status;

/// Terminal result of one attempt.
#[derive(Debug)]
pub struct TestResult {
    pub status: Status,
    pub duration: Duration,
    pub start_time: DateTime<Utc>,
    /// What the body raised, if anything. Kept even when `fail = true`
    /// turned the error into a pass.
    pub error: Option<anyhow::Error>,
}

impl TestResult {
    /// Result for an attempt that never ran its body.
    pub fn not_started(status: Status) -> Self {
        Self {
            status,
            duration: Duration::ZERO,
            start_time: Utc::now(),
            error: None,
        }
    }
}

/// Passed to `on_test_start`.
///
/// `status` is set only for attempts that end without running: skipped,
/// body-less, or not run in time.
#[derive(Debug, Clone)]
pub struct TestStartEvent {
    pub repeat_index: usize,
    pub retry_index: usize,
    pub status: Option<Status>,
    pub test: Arc<ResolvedTest>,
}

/// Passed to `on_test_end`.
#[derive(Debug)]
pub struct TestEndEvent {
    pub repeat_index: usize,
    pub retry_index: usize,
    pub result: TestResult,
    /// Report fragment for this attempt (empty for interrupted / not run).
    pub report: String,
    pub test: Arc<ResolvedTest>,
}

/// A hook error together with the event that triggered it.
#[derive(Debug)]
pub struct HookError<E> {
    pub error: anyhow::Error,
    pub event: E,
}

pub type TestStartError = HookError<TestStartEvent>;
pub type TestEndError = HookError<TestEndEvent>;

/// A filter predicate failed for `test`; the test was excluded.
#[derive(Debug)]
pub struct FilterError {
    pub error: anyhow::Error,
    pub test: Arc<ResolvedTest>,
}
