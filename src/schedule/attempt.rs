// src/schedule/attempt.rs

//! One schedulable execution of a test.

use std::sync::Arc;

use crate::engine::events::TestStartEvent;
use crate::suite::resolve::ResolvedTest;
use crate::types::Status;

/// A single attempt: test × repeat index × retry index.
///
/// `repeat_index` is 1-based, `retry_index` is 0 for the first try.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub test: Arc<ResolvedTest>,
    pub repeat_index: usize,
    pub retry_index: usize,
    /// Status assigned without running the body (skipped, body-less).
    pub preset: Option<Status>,
}

impl Attempt {
    pub(crate) fn new(test: Arc<ResolvedTest>, repeat_index: usize, retry_index: usize) -> Self {
        Self {
            test,
            repeat_index,
            retry_index,
            preset: None,
        }
    }

    pub(crate) fn preset(test: Arc<ResolvedTest>, status: Status) -> Self {
        Self {
            test,
            repeat_index: 1,
            retry_index: 0,
            preset: Some(status),
        }
    }

    /// Whether a failure of this attempt should schedule another try.
    pub fn can_retry(&self) -> bool {
        self.preset.is_none() && self.retry_index < self.test.retries
    }

    /// The attempt that follows this one after a failure.
    pub(crate) fn next_retry(&self) -> Self {
        Self::new(
            Arc::clone(&self.test),
            self.repeat_index,
            self.retry_index + 1,
        )
    }

    pub fn start_event(&self, status: Option<Status>) -> TestStartEvent {
        TestStartEvent {
            repeat_index: self.repeat_index,
            retry_index: self.retry_index,
            status,
            test: Arc::clone(&self.test),
        }
    }
}
