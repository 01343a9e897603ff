// src/engine/mod.rs

//! Run orchestration.
//!
//! - [`core`] is the synchronous bookkeeping: counters, report fragments,
//!   per-test hooks and the retry feedback loop.
//! - [`runtime`] is the async shell: suite hooks, the scheduling loop and
//!   the race against interruption.
//! - [`interrupt`] tracks run timeout, external signal and the
//!   max-failures breaker.
//! - [`events`] and [`result`] are the records handed to hooks and
//!   returned to callers.

pub mod core;
pub mod events;
pub mod interrupt;
pub mod result;
pub mod runtime;

pub use core::{AttemptEnd, RunCore};
pub use events::{
    FilterError, HookError, TestEndError, TestEndEvent, TestResult, TestStartError,
    TestStartEvent,
};
pub use interrupt::Interruption;
pub use result::{RunResult, StatusCounts};
pub use runtime::run_suite;
