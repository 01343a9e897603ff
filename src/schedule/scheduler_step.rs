// src/schedule/scheduler_step.rs

//! Result type for one scheduler step.

/// What the scheduler looks like after [`Scheduler::advance`].
///
/// The run loop uses this to decide whether to pull another attempt or
/// wait for an in-flight one to settle.
///
/// [`Scheduler::advance`]: crate::schedule::Scheduler::advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Id of the task created in this step, if the attempt went async.
    pub launched: Option<u64>,
    /// Attempts currently in flight.
    pub in_flight: usize,
    /// No room for another in-flight attempt.
    pub at_max_concurrency: bool,
}
