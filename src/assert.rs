// src/assert.rs

//! A minimal assertion helper for test bodies.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

static ASSERT_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Fail with `"<message>: false is not true"` unless `value` holds.
pub fn assert_value_is_true(value: bool, message: &str) -> anyhow::Result<()> {
    assert_with_payload(value, Some(message), None)
}

/// Like [`assert_value_is_true`], with an optional message and a JSON
/// payload appended (pretty-printed) to the failure message.
pub fn assert_with_payload(
    value: bool,
    message: Option<&str>,
    payload: Option<&Value>,
) -> anyhow::Result<()> {
    ASSERT_COUNT.fetch_add(1, Ordering::Relaxed);

    if value {
        return Ok(());
    }

    let prefix = match message {
        Some(message) if !message.is_empty() => format!("{message}: "),
        _ => String::new(),
    };
    let payload = match payload {
        Some(payload) => format!(" {}", serde_json::to_string_pretty(payload)?),
        None => String::new(),
    };

    anyhow::bail!("{prefix}{value} is not true{payload}")
}

/// Number of assertions evaluated by this process so far.
pub fn assert_count() -> usize {
    ASSERT_COUNT.load(Ordering::Relaxed)
}
