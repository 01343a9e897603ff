// src/schedule/mod.rs

//! Attempt generation and bounded scheduling.
//!
//! - [`attempt`] defines the unit of scheduling.
//! - [`units`] expands resolved tests into attempts, lazily, with
//!   only/filter selection and the repeat × retry policy.
//! - [`scheduler`] keeps at most `concurrency` attempts in flight.
//! - [`scheduler_step`] defines the result type for scheduler steps.

pub mod attempt;
pub mod scheduler;
pub mod scheduler_step;
pub mod units;

pub use attempt::Attempt;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use units::UnitGenerator;
