// src/exec/task_runner.rs

//! Drives a single asynchronous test body to its terminal status.

use std::panic::AssertUnwindSafe;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::debug;

use crate::engine::events::TestResult;
use crate::errors::panic_to_error;
use crate::types::Status;

/// Sent back to the scheduler when an in-flight attempt settles.
#[derive(Debug)]
pub struct TaskEnded {
    pub id: u64,
    pub result: TestResult,
}

/// What the runner needs to know about the attempt it drives.
#[derive(Debug, Clone, Copy)]
pub struct RunningAttempt {
    pub id: u64,
    pub fail: bool,
    /// Launch time plus the test timeout. Time the body spent before
    /// returning its future, and any time before the runner is first
    /// polled, counts against it. `None` if the timeout is too large to
    /// represent.
    pub deadline: Option<Instant>,
    pub start_time: DateTime<Utc>,
    pub started: Instant,
}

/// Map what a body produced to a status, honouring `fail` inversion.
///
/// The error is kept even when inversion turns it into a pass.
pub fn settle(outcome: anyhow::Result<()>, fail: bool) -> (Status, Option<anyhow::Error>) {
    let error = outcome.err();
    let status = if error.is_some() == fail {
        Status::Passed
    } else {
        Status::Failed
    };
    (status, error)
}

/// Race the body against the attempt's deadline.
///
/// - Whichever settles first decides the status; the loser is dropped.
/// - A deadline that has already passed wins over a body that is ready.
/// - If the cancel channel fires (run interrupted) the body is dropped and
///   **no** [`TaskEnded`] is sent; the scheduler records the attempt itself.
pub async fn run_attempt(
    attempt: RunningAttempt,
    body: BoxFuture<'static, anyhow::Result<()>>,
    ended_tx: mpsc::UnboundedSender<TaskEnded>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let deadline = async {
        match attempt.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    let (status, error) = tokio::select! {
        biased;

        _ = &mut cancel_rx => {
            debug!(id = attempt.id, "attempt cancelled; dropping body");
            return;
        }

        _ = deadline => {
            debug!(id = attempt.id, "attempt timed out");
            (Status::TimedOut, None)
        }

        settled = AssertUnwindSafe(body).catch_unwind() => {
            let outcome = settled.unwrap_or_else(|payload| Err(panic_to_error(payload)));
            settle(outcome, attempt.fail)
        }
    };

    let result = TestResult {
        status,
        duration: attempt.started.elapsed(),
        start_time: attempt.start_time,
        error,
    };

    if ended_tx
        .send(TaskEnded {
            id: attempt.id,
            result,
        })
        .is_err()
    {
        debug!(id = attempt.id, "scheduler gone before attempt settled");
    }
}
