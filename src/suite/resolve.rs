// src/suite/resolve.rs

//! Merging a declared test with run and suite defaults.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::suite::declare::{Body, TestOptions};
use crate::types::Marker;

/// Name used for tests declared without one.
pub const ANONYMOUS: &str = "anonymous";

/// Fully specified test, created once per run and never mutated.
#[derive(Debug, Clone)]
pub struct ResolvedTest {
    pub name: String,
    pub body: Option<Body>,
    pub fail: bool,
    pub only: bool,
    pub skip: Marker,
    pub todo: Marker,
    pub parameters: Vec<Value>,
    /// Always at least 1.
    pub repeats: usize,
    pub retries: usize,
    pub timeout: Duration,
    pub extra: Map<String, Value>,
}

/// Per-run values for the fields a test may leave unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestDefaults {
    pub repeats: usize,
    pub retries: usize,
    pub timeout: Duration,
}

/// Resolve one declared test: explicit test value, else the run-level default.
///
/// `defaults` already has run options layered over the suite configuration.
pub fn resolve_test(declared: &TestOptions, defaults: &TestDefaults) -> ResolvedTest {
    ResolvedTest {
        name: declared
            .name
            .clone()
            .unwrap_or_else(|| ANONYMOUS.to_string()),
        body: declared.body.clone(),
        fail: declared.fail.unwrap_or(false),
        only: declared.only.unwrap_or(false),
        skip: declared.skip.clone().unwrap_or_default(),
        todo: declared.todo.clone().unwrap_or_default(),
        parameters: declared.parameters.clone().unwrap_or_default(),
        repeats: declared.repeats.unwrap_or(defaults.repeats).max(1),
        retries: declared.retries.unwrap_or(defaults.retries),
        timeout: declared.timeout.unwrap_or(defaults.timeout),
        extra: declared.extra.clone(),
    }
}
