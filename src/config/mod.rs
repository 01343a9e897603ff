// src/config/mod.rs

//! Configuration for tapsuite.
//!
//! Responsibilities:
//! - Define the TOML-backed suite configuration (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like `concurrency >= 1` (`validate.rs`).
//! - Layer per-run overrides and hooks over the suite values (`options.rs`).

pub mod loader;
pub mod model;
pub mod options;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{RawSuiteConfig, SuiteConfig};
pub use options::{
    FilterFn, Hooks, PrintFn, RunOptions, RunSettings, SuiteEndHook, SuiteStartHook,
    TestEndHook, TestStartHook,
};
