// src/exec/executor.rs

//! Starting one attempt.
//!
//! Preset and body-less attempts are recorded straight away. A body that
//! returns `Ready` is recorded before [`launch`] returns; only a `Pending`
//! body becomes an in-flight [`Task`] owned by the scheduler.

use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::engine::core::{AttemptEnd, RunCore};
use crate::engine::events::TestResult;
use crate::errors::panic_to_error;
use crate::exec::task_runner::{RunningAttempt, TaskEnded, run_attempt, settle};
use crate::schedule::Attempt;
use crate::suite::declare::Outcome;
use crate::types::Status;

/// An attempt whose body is still running.
#[derive(Debug)]
pub struct Task {
    pub id: u64,
    pub attempt: Attempt,
    pub start_time: DateTime<Utc>,
    pub started: Instant,
    cancel: Option<oneshot::Sender<()>>,
    pub(crate) handle: JoinHandle<()>,
}

impl Task {
    /// Ask the runner to drop the body and its timer. A runner that has
    /// already settled still delivers its [`TaskEnded`].
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // Err only means the runner is already gone.
            let _ = cancel.send(());
        }
    }

    /// Wait until the runner has returned. After this, any [`TaskEnded`]
    /// it produced is in the channel.
    pub async fn settled(&mut self) {
        if let Err(error) = (&mut self.handle).await {
            debug!(id = self.id, error = %error, "attempt runner did not finish cleanly");
        }
    }

    /// Result for a task cut short by an interruption.
    pub fn interrupted(&self) -> TestResult {
        TestResult {
            status: Status::Interrupted,
            duration: self.started.elapsed(),
            start_time: self.start_time,
            error: None,
        }
    }
}

/// Start `attempt`. Returns the in-flight task if the body went async.
pub fn launch(
    id: u64,
    attempt: Attempt,
    core: &mut RunCore,
    ended_tx: &mpsc::UnboundedSender<TaskEnded>,
) -> Option<Task> {
    if let Some(status) = attempt.preset {
        core.end_attempt(attempt, AttemptEnd::NotStarted(status));
        return None;
    }

    let Some(body) = attempt.test.body.clone() else {
        core.end_attempt(attempt, AttemptEnd::NotStarted(Status::HasNoBody));
        return None;
    };

    core.notify_test_start(&attempt, None);

    let start_time = Utc::now();
    let started = Instant::now();

    let outcome = catch_unwind(AssertUnwindSafe(|| body.call(&attempt.test.parameters)))
        .unwrap_or_else(|payload| Outcome::Ready(Err(panic_to_error(payload))));

    match outcome {
        Outcome::Ready(outcome) => {
            let (status, error) = settle(outcome, attempt.test.fail);
            let result = TestResult {
                status,
                duration: started.elapsed(),
                start_time,
                error,
            };
            core.end_attempt(attempt, AttemptEnd::Ended(result));
            None
        }
        Outcome::Pending(future) => {
            let running = RunningAttempt {
                id,
                fail: attempt.test.fail,
                deadline: started.checked_add(attempt.test.timeout),
                start_time,
                started,
            };

            debug!(
                id,
                test = %attempt.test.name,
                repeat_index = attempt.repeat_index,
                retry_index = attempt.retry_index,
                timeout_ms = attempt.test.timeout.as_millis() as u64,
                "attempt in flight"
            );

            let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
            let handle = tokio::spawn(run_attempt(running, future, ended_tx.clone(), cancel_rx));

            Some(Task {
                id,
                attempt,
                start_time,
                started,
                cancel: Some(cancel_tx),
                handle,
            })
        }
    }
}
