// src/engine/interrupt.rs

//! The three ways a run can be cut short: run timeout, external signal and
//! the max-failures breaker.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::types::InterruptionCause;

/// Tracks whether (and why) the current run was interrupted.
///
/// The first cause wins; later ones are ignored.
#[derive(Debug)]
pub struct Interruption {
    cause: Option<InterruptionCause>,
    deadline: Option<Instant>,
    signal: Option<CancellationToken>,
}

impl Interruption {
    /// Start the run timer and watch `signal`. A signal that is already
    /// cancelled interrupts immediately.
    pub fn arm(run_timeout: Duration, signal: Option<CancellationToken>) -> Self {
        let mut interruption = Self {
            cause: None,
            deadline: Instant::now().checked_add(run_timeout),
            signal,
        };

        if interruption
            .signal
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            interruption.trip(InterruptionCause::Signal);
        }

        interruption
    }

    pub fn cause(&self) -> Option<InterruptionCause> {
        self.cause
    }

    /// Record `cause` unless another one was recorded first.
    pub fn trip(&mut self, cause: InterruptionCause) {
        match self.cause {
            None => {
                warn!(cause = cause.label(), "suite run interrupted");
                self.cause = Some(cause);
            }
            Some(first) => {
                info!(
                    first = first.label(),
                    ignored = cause.label(),
                    "run already interrupted"
                );
            }
        }
    }

    /// Check signal and deadline without waiting.
    pub fn poll(&mut self) -> Option<InterruptionCause> {
        if self.cause.is_none() {
            if self.signal.as_ref().is_some_and(CancellationToken::is_cancelled) {
                self.trip(InterruptionCause::Signal);
            } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                self.trip(InterruptionCause::Timeout);
            }
        }
        self.cause
    }

    /// Resolve once the signal fires or the deadline passes. Never resolves
    /// if neither can happen. Cancel safe; does not record the cause.
    pub async fn wait(&self) -> InterruptionCause {
        let signal = async {
            match &self.signal {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = signal => InterruptionCause::Signal,
            _ = deadline => InterruptionCause::Timeout,
        }
    }

    /// Stop watching the signal and the timer once the loop is done.
    pub fn disarm(&mut self) {
        self.signal = None;
        self.deadline = None;
    }
}
