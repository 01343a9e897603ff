// src/schedule/scheduler.rs

//! Bounded set of in-flight attempts.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::core::{AttemptEnd, RunCore};
use crate::exec::{Task, TaskEnded, launch};
use crate::schedule::attempt::Attempt;
use crate::schedule::scheduler_step::SchedulerStep;

/// Owns every in-flight [`Task`] and the channel their runners report on.
///
/// Tasks are keyed by a monotonically increasing id, so iteration order is
/// launch order.
#[derive(Debug)]
pub struct Scheduler {
    concurrency: usize,
    in_flight: BTreeMap<u64, Task>,
    next_id: u64,
    ended_tx: mpsc::UnboundedSender<TaskEnded>,
    ended_rx: mpsc::UnboundedReceiver<TaskEnded>,
}

impl Scheduler {
    pub fn new(concurrency: usize) -> Self {
        let (ended_tx, ended_rx) = mpsc::unbounded_channel();
        Self {
            concurrency: concurrency.max(1),
            in_flight: BTreeMap::new(),
            next_id: 0,
            ended_tx,
            ended_rx,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.in_flight.len() < self.concurrency
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Launch `unit` (if any) and report the resulting state.
    pub fn advance(&mut self, unit: Option<Attempt>, core: &mut RunCore) -> SchedulerStep {
        let launched = unit.and_then(|attempt| {
            let id = self.next_id;
            self.next_id += 1;

            let task = launch(id, attempt, core, &self.ended_tx)?;
            self.in_flight.insert(id, task);
            Some(id)
        });

        SchedulerStep {
            launched,
            in_flight: self.in_flight.len(),
            at_max_concurrency: !self.has_capacity(),
        }
    }

    /// Record an attempt reported by its runner. Unknown ids (tasks already
    /// written off by an interruption) are ignored.
    pub fn finish(&mut self, ended: TaskEnded, core: &mut RunCore) {
        match self.in_flight.remove(&ended.id) {
            Some(task) => core.end_attempt(task.attempt, AttemptEnd::Ended(ended.result)),
            None => debug!(id = ended.id, "ignoring result of unknown task"),
        }
    }

    /// Record every result already waiting in the channel without blocking.
    pub fn collect_finished(&mut self, core: &mut RunCore) -> usize {
        let mut collected = 0;
        while let Ok(ended) = self.ended_rx.try_recv() {
            self.finish(ended, core);
            collected += 1;
        }
        collected
    }

    /// Wait for the next in-flight attempt to settle. Cancel safe.
    pub async fn next_task_end(&mut self) -> Option<TaskEnded> {
        self.ended_rx.recv().await
    }

    /// Cut the run short, in launch order.
    ///
    /// Every runner is cancelled and waited for. Attempts that settled
    /// before their runner saw the cancellation keep their real result;
    /// the rest are recorded as interrupted.
    pub async fn interrupt(&mut self, core: &mut RunCore) -> usize {
        for task in self.in_flight.values_mut() {
            task.cancel();
        }
        for task in self.in_flight.values_mut() {
            task.settled().await;
        }

        self.collect_finished(core);

        let tasks = std::mem::take(&mut self.in_flight);
        let interrupted = tasks.len();
        if interrupted > 0 {
            info!(interrupted, "in-flight attempts interrupted");
        }

        for (_, task) in tasks {
            let result = task.interrupted();
            core.end_attempt(task.attempt, AttemptEnd::Ended(result));
        }

        interrupted
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::model::SuiteConfig;
    use crate::config::options::{Hooks, RunOptions, RunSettings};
    use crate::schedule::UnitGenerator;
    use crate::suite::declare::{Body, TestOptions};
    use crate::suite::resolve::resolve_test;
    use crate::types::Status;

    fn core_with(tests: Vec<TestOptions>) -> RunCore {
        let settings = RunSettings::resolve(
            &SuiteConfig::named("scheduler"),
            &Hooks::default().print(|_| {}),
            RunOptions::default(),
        );
        let resolved = tests
            .iter()
            .map(|t| resolve_test(t, &settings.test_defaults))
            .collect();
        RunCore::new(settings, tests.len(), UnitGenerator::new(resolved, None))
    }

    fn sleeping(name: &str, ms: u64) -> TestOptions {
        TestOptions::default().name(name).body(Body::future(move |_| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            anyhow::Ok(())
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn async_attempts_are_bounded_and_settle_through_the_channel() {
        let mut core = core_with(vec![sleeping("a", 10), sleeping("b", 30)]);
        let mut scheduler = Scheduler::new(1);

        let unit = core.next_unit();
        let step = scheduler.advance(unit, &mut core);
        assert_eq!(step.launched, Some(0));
        assert!(step.at_max_concurrency);
        assert!(!scheduler.has_capacity());

        let ended = scheduler.next_task_end().await.unwrap();
        scheduler.finish(ended, &mut core);
        assert!(scheduler.is_idle());
        assert_eq!(core.result().count(Status::Passed), 1);
    }

    #[tokio::test]
    async fn sync_and_preset_attempts_never_occupy_a_slot() {
        let mut core = core_with(vec![
            TestOptions::default().name("sync").body(Body::sync(|_| Ok(()))),
            TestOptions::default().name("skipped").skip(true),
        ]);
        let mut scheduler = Scheduler::new(1);

        while let Some(unit) = core.next_unit() {
            let step = scheduler.advance(Some(unit), &mut core);
            assert_eq!(step.launched, None);
            assert_eq!(step.in_flight, 0);
        }

        assert_eq!(core.result().count(Status::Passed), 1);
        assert_eq!(core.result().count(Status::Skipped), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_cancels_in_flight_tasks() {
        let mut core = core_with(vec![sleeping("a", 1_000), sleeping("b", 1_000)]);
        let mut scheduler = Scheduler::new(2);

        for _ in 0..2 {
            let unit = core.next_unit();
            scheduler.advance(unit, &mut core);
        }
        assert_eq!(scheduler.in_flight(), 2);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(scheduler.interrupt(&mut core).await, 2);

        assert!(scheduler.is_idle());
        assert_eq!(core.result().count(Status::Interrupted), 2);
        assert!(core.result().report.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn interrupt_keeps_results_of_attempts_that_already_settled() {
        let quick = TestOptions::default()
            .name("quick")
            .body(Body::future(|_| async { anyhow::Ok(()) }));
        let mut core = core_with(vec![quick, sleeping("slow", 10_000)]);
        let mut scheduler = Scheduler::new(2);

        for _ in 0..2 {
            let unit = core.next_unit();
            scheduler.advance(unit, &mut core);
        }

        // Let the quick runner finish on a worker without draining the
        // channel.
        for _ in 0..200 {
            if scheduler.in_flight[&0].handle.is_finished() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(scheduler.interrupt(&mut core).await, 1);
        assert_eq!(core.result().count(Status::Passed), 1);
        assert_eq!(core.result().count(Status::Interrupted), 1);
        assert!(core.result().report.starts_with("ok 1 - quick\n"));
    }
}
