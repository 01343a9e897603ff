// src/exec/mod.rs

//! Execution layer.
//!
//! - [`executor`] starts an attempt: presets are recorded immediately,
//!   synchronous bodies run inline, asynchronous ones become a [`Task`].
//! - [`task_runner`] races an asynchronous body against its timeout and
//!   reports back to the scheduler over a channel.

pub mod executor;
pub mod task_runner;

pub use executor::{Task, launch};
pub use task_runner::{TaskEnded, settle};
