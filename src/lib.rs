// src/lib.rs

//! tapsuite: runs a suite of declared tests with bounded concurrency,
//! per-test timeouts, repeats and retries, and produces a TAP-like report.
//!
//! ```no_run
//! use tapsuite::{Body, RunOptions, Suite, TestOptions};
//!
//! # async fn demo() {
//! let mut suite = Suite::new("math");
//! suite.add_test(
//!     TestOptions::default()
//!         .name("adds")
//!         .body(Body::sync(|_| tapsuite::assert_value_is_true(1 + 1 == 2, "sum"))),
//! );
//!
//! let result = suite.run(RunOptions::default().concurrency(4)).await;
//! println!("{}", result.report);
//! # }
//! ```

pub mod assert;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod schedule;
pub mod suite;
pub mod types;

pub use assert::{assert_count, assert_value_is_true, assert_with_payload};
pub use config::{Hooks, RunOptions, RunSettings, SuiteConfig};
pub use engine::{RunResult, StatusCounts, TestEndEvent, TestResult, TestStartEvent};
pub use errors::{Result, SuiteError};
pub use suite::{Body, Outcome, ResolvedTest, Suite, TestOptions, TestSpec};
pub use types::{InterruptionCause, Marker, RunStatus, Status};
