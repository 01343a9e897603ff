// src/engine/runtime.rs

//! Async shell around [`RunCore`]: suite hooks, the scheduling loop and the
//! interruption race.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::model::SuiteConfig;
use crate::config::options::{Hooks, RunOptions, RunSettings};
use crate::engine::core::RunCore;
use crate::engine::interrupt::Interruption;
use crate::engine::result::RunResult;
use crate::errors::panic_to_error;
use crate::schedule::{Scheduler, UnitGenerator};
use crate::suite::declare::{Outcome, TestOptions};
use crate::suite::resolve::{ResolvedTest, resolve_test};
use crate::types::InterruptionCause;

/// Run `declared` once with `options` layered over the suite configuration.
///
/// Never fails: body and hook errors end up in the returned [`RunResult`].
pub async fn run_suite(
    config: &SuiteConfig,
    hooks: &Hooks,
    declared: &[TestOptions],
    options: RunOptions,
) -> RunResult {
    let settings = RunSettings::resolve(config, hooks, options);
    let tests = declared
        .iter()
        .map(|test| resolve_test(test, &settings.test_defaults))
        .collect();

    Runtime::new(settings, declared.len(), tests).run().await
}

/// State of one run in progress.
#[derive(Debug)]
struct Runtime {
    core: RunCore,
    scheduler: Scheduler,
    interruption: Interruption,
}

impl Runtime {
    fn new(settings: RunSettings, tests_in_suite: usize, tests: Vec<ResolvedTest>) -> Self {
        let interruption = Interruption::arm(settings.run_timeout, settings.signal.clone());
        let scheduler = Scheduler::new(settings.concurrency);
        let units = UnitGenerator::new(tests, settings.filter.clone());

        Self {
            core: RunCore::new(settings, tests_in_suite, units),
            scheduler,
            interruption,
        }
    }

    async fn run(mut self) -> RunResult {
        let started = Instant::now();

        {
            let settings = self.core.settings();
            info!(
                suite = %settings.name,
                concurrency = settings.concurrency,
                max_failures = ?settings.max_failures,
                run_timeout_ms = settings.run_timeout.as_millis() as u64,
                "suite run started"
            );
        }

        let hook = Arc::clone(&self.core.settings().on_suite_start);
        let settled = settle_hook(|| hook(self.core.settings())).await;
        if let Err(error) = settled {
            self.core.record_suite_start_error(error);
        }

        self.drive().await;
        self.interruption.disarm();

        if let Some(cause) = self.interruption.cause() {
            self.core.mark_interrupted(cause);
            self.scheduler.interrupt(&mut self.core).await;
        }

        let not_run = self.core.drain_not_run();
        if not_run > 0 {
            debug!(not_run, "remaining attempts reported as not run in time");
        }

        self.core.finish_report();
        self.core.set_duration(started.elapsed());

        let hook = Arc::clone(&self.core.settings().on_suite_end);
        let settled = settle_hook(|| hook(self.core.settings(), self.core.result())).await;
        if let Err(error) = settled {
            self.core.record_suite_end_error(error);
        }

        self.core.set_duration(started.elapsed());

        let result = self.core.into_result();
        info!(
            suite = %result.name,
            run_status = %result.run_status,
            tests_in_run = result.tests_in_run,
            duration_ms = result.duration.as_millis() as u64,
            "suite run finished"
        );
        result
    }

    /// Pull, launch and wait until the generator is exhausted with nothing
    /// in flight, or the run is interrupted.
    async fn drive(&mut self) {
        loop {
            if self.interruption.poll().is_some() {
                return;
            }

            self.scheduler.collect_finished(&mut self.core);

            if self.core.max_failures_reached() {
                self.interruption.trip(InterruptionCause::MaxFailures);
                return;
            }

            let unit = if self.scheduler.has_capacity() {
                self.core.next_unit()
            } else {
                None
            };
            let pulled = unit.is_some();
            let step = self.scheduler.advance(unit, &mut self.core);

            if !pulled && step.in_flight == 0 {
                return;
            }

            if (step.at_max_concurrency || !pulled) && step.in_flight > 0 {
                tokio::select! {
                    biased;

                    ended = self.scheduler.next_task_end() => {
                        if let Some(ended) = ended {
                            self.scheduler.finish(ended, &mut self.core);
                        }
                    }

                    cause = self.interruption.wait() => {
                        self.interruption.trip(cause);
                    }
                }
            }
        }
    }
}

/// Invoke a suite hook and wait for it if it returned a future. Panics are
/// folded into the error.
async fn settle_hook(call: impl FnOnce() -> Outcome) -> anyhow::Result<()> {
    let outcome = std::panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|payload| Outcome::Ready(Err(panic_to_error(payload))));

    match outcome {
        Outcome::Ready(result) => result,
        Outcome::Pending(future) => AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(panic_to_error(payload))),
    }
}
