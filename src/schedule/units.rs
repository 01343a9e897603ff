// src/schedule/units.rs

//! Pull-based expansion of resolved tests into attempts.
//!
//! Selection (only / filter) happens once, on the first pull. After that,
//! every pull serves a pending retry first and only then moves on to the
//! next repeat or the next test.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::options::FilterFn;
use crate::engine::events::FilterError;
use crate::errors::catch_panic;
use crate::schedule::attempt::Attempt;
use crate::suite::resolve::ResolvedTest;
use crate::types::Status;

/// Progress through the current test.
#[derive(Debug)]
struct Cursor {
    test: Arc<ResolvedTest>,
    next_repeat: usize,
}

pub struct UnitGenerator {
    pending: VecDeque<Arc<ResolvedTest>>,
    selected: bool,
    only_active: bool,
    filter: Option<FilterFn>,
    filter_errors: Vec<FilterError>,
    current: Option<Cursor>,
    retries: VecDeque<Attempt>,
}

impl UnitGenerator {
    pub fn new(tests: Vec<ResolvedTest>, filter: Option<FilterFn>) -> Self {
        Self {
            pending: tests.into_iter().map(Arc::new).collect(),
            selected: false,
            only_active: false,
            filter,
            filter_errors: Vec::new(),
            current: None,
            retries: VecDeque::new(),
        }
    }

    /// Next attempt to schedule, or `None` once nothing is left right now.
    ///
    /// `None` is not final while attempts are still running: a later failure
    /// may queue a retry.
    pub fn next_attempt(&mut self) -> Option<Attempt> {
        if !self.selected {
            self.select();
        }

        if let Some(retry) = self.retries.pop_front() {
            return Some(retry);
        }

        loop {
            if let Some(cursor) = self.current.as_mut() {
                if cursor.next_repeat <= cursor.test.repeats {
                    let attempt = Attempt::new(Arc::clone(&cursor.test), cursor.next_repeat, 0);
                    cursor.next_repeat += 1;
                    return Some(attempt);
                }
                self.current = None;
            }

            let test = self.pending.pop_front()?;

            if !self.only_active && test.skip.is_set() {
                return Some(Attempt::preset(test, Status::Skipped));
            }

            if test.body.is_none() {
                return Some(Attempt::preset(test, Status::HasNoBody));
            }

            self.current = Some(Cursor {
                test,
                next_repeat: 1,
            });
        }
    }

    /// Feed back the terminal status of an attempt; failures with retry
    /// budget left queue the next try.
    pub fn attempt_ended(&mut self, attempt: &Attempt, status: Status) {
        if status.is_failure() && attempt.can_retry() {
            debug!(
                test = %attempt.test.name,
                repeat_index = attempt.repeat_index,
                retry_index = attempt.retry_index + 1,
                "queueing retry"
            );
            self.retries.push_back(attempt.next_retry());
        }
    }

    /// Errors raised by the filter predicate so far.
    pub fn take_filter_errors(&mut self) -> Vec<FilterError> {
        std::mem::take(&mut self.filter_errors)
    }

    fn select(&mut self) {
        self.selected = true;
        self.only_active = self.pending.iter().any(|test| test.only);

        if self.only_active {
            self.pending.retain(|test| test.only);
            debug!(selected = self.pending.len(), "only-tests present; other tests excluded");
            return;
        }

        let Some(filter) = self.filter.clone() else {
            return;
        };

        let mut kept = VecDeque::with_capacity(self.pending.len());
        for test in self.pending.drain(..) {
            match catch_panic(|| filter(test.as_ref())) {
                Ok(true) => kept.push_back(test),
                Ok(false) => {}
                Err(error) => {
                    warn!(test = %test.name, error = %error, "filter failed; excluding test");
                    self.filter_errors.push(FilterError { error, test });
                }
            }
        }
        self.pending = kept;
    }
}

impl fmt::Debug for UnitGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitGenerator")
            .field("pending", &self.pending.len())
            .field("selected", &self.selected)
            .field("only_active", &self.only_active)
            .field("current", &self.current)
            .field("retries", &self.retries.len())
            .finish_non_exhaustive()
    }
}
