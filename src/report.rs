// src/report.rs

//! Line-oriented TAP-like report.
//!
//! Each terminal attempt contributes one test point (optionally followed by
//! an indented YAML-ish block); the run ends with an optional `Bail out!`
//! line and the plan line.

use std::fmt::Write as _;
use std::time::Duration;

use serde_json::Value;

use crate::engine::events::TestResult;
use crate::engine::result::StatusCounts;
use crate::schedule::Attempt;
use crate::suite::resolve::ResolvedTest;
use crate::types::{RunStatus, Status};

/// Escape a name or reason: whitespace becomes a plain space, `\` and `#`
/// are backslash-escaped.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            c if c.is_whitespace() => out.push(' '),
            '\\' => out.push_str("\\\\"),
            '#' => out.push_str("\\#"),
            c => out.push(c),
        }
    }
    out
}

/// Report fragment for one terminal attempt.
///
/// `number` is the attempt's position in the run (the current
/// `tests_in_run`). Interrupted and not-run attempts produce nothing.
pub fn test_point(number: usize, attempt: &Attempt, result: &TestResult, oneline: bool) -> String {
    let status = result.status;
    if matches!(status, Status::Interrupted | Status::WasNotRunInTime) {
        return String::new();
    }

    let test = &attempt.test;
    let is_ok = !status.is_failure();
    let mut out = format!(
        "{}ok {number} - {}{}\n",
        if is_ok { "" } else { "not " },
        escape(&test.name),
        directive(test),
    );

    if is_ok && oneline {
        return out;
    }

    let mut fields = vec![format!("duration: {}", format_millis(result.duration))];

    if let Some(error) = &result.error {
        fields.push(format!("error: |\n    {}", indent(&format!("{error:#}"))));
    } else if status == Status::TimedOut {
        fields.push(format!(
            "error: |\n    {}ms timeout expired",
            test.timeout.as_millis()
        ));
    }

    if !test.parameters.is_empty() {
        fields.push(format!(
            "parameters: {}",
            Value::Array(test.parameters.clone())
        ));
    }

    if attempt.repeat_index > 1 {
        fields.push(format!("repeatIndex: {}", attempt.repeat_index));
    }

    if attempt.retry_index > 0 {
        fields.push(format!("retryIndex: {}", attempt.retry_index));
    }

    if matches!(status, Status::HasNoBody | Status::TimedOut) {
        fields.push(format!("status: {status}"));
    }

    let _ = write!(out, "  ---\n  {}\n  ...\n", fields.join("\n  "));
    out
}

/// Bail-out (when interrupted) and plan lines.
pub fn summary(
    name: &str,
    run_status: RunStatus,
    counts: &StatusCounts,
    tests_in_run: usize,
) -> String {
    let mut out = String::new();

    if let RunStatus::Interrupted(cause) = run_status {
        let _ = writeln!(
            out,
            "Bail out! The suite run was interrupted by {}.",
            cause.label()
        );
    }

    let counters = Status::ALL
        .into_iter()
        .filter(|status| counts.get(*status) > 0)
        .map(|status| format!("{status}: {}", counts.get(status)))
        .collect::<Vec<_>>()
        .join(", ");

    let counters = if counters.is_empty() {
        "no tests were run".to_string()
    } else {
        counters
    };

    let _ = writeln!(out, "1..{tests_in_run} # {} ({counters})", escape(name));
    out
}

/// Summary in place until a run completes.
pub fn unfinished_summary(name: &str) -> String {
    format!(
        "Bail out! The suite run did not work to the end.\n1..0 # {} (no tests were run)\n",
        escape(name)
    )
}

fn directive(test: &ResolvedTest) -> String {
    let (label, marker) = if test.skip.is_set() {
        ("skip", &test.skip)
    } else if test.todo.is_set() {
        ("todo", &test.todo)
    } else {
        return String::new();
    };

    match marker.reason() {
        Some(reason) => format!(" # {label} {}", escape(reason)),
        None => format!(" # {label}"),
    }
}

fn format_millis(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64() * 1000.0)
}

fn indent(message: &str) -> String {
    message.split('\n').collect::<Vec<_>>().join("\n    ")
}
