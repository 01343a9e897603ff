// src/types.rs

//! Shared vocabulary: attempt statuses, run statuses and skip/todo markers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Terminal status of a single attempt.
///
/// The declaration order is the order used when counters are listed in the
/// report plan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Failed,
    HasNoBody,
    Interrupted,
    Passed,
    Skipped,
    TimedOut,
    WasNotRunInTime,
}

impl Status {
    pub const ALL: [Status; 7] = [
        Status::Failed,
        Status::HasNoBody,
        Status::Interrupted,
        Status::Passed,
        Status::Skipped,
        Status::TimedOut,
        Status::WasNotRunInTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Failed => "failed",
            Status::HasNoBody => "hasNoBody",
            Status::Interrupted => "interrupted",
            Status::Passed => "passed",
            Status::Skipped => "skipped",
            Status::TimedOut => "timedOut",
            Status::WasNotRunInTime => "wasNotRunInTime",
        }
    }

    /// `failed` and `timedOut` are the statuses that count as failures
    /// (retries, max-failures breaker, run status).
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failed | Status::TimedOut)
    }

    /// Statuses assigned without ever invoking the body.
    pub fn is_not_started(self) -> bool {
        matches!(
            self,
            Status::HasNoBody | Status::Skipped | Status::WasNotRunInTime
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("invalid status: {s}"))
    }
}

/// Why a run stopped before the unit generator was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptionCause {
    MaxFailures,
    Signal,
    Timeout,
}

impl InterruptionCause {
    /// Suffix used after `interruptedBy` and in the bail-out line.
    pub fn label(self) -> &'static str {
        match self {
            InterruptionCause::MaxFailures => "MaxFailures",
            InterruptionCause::Signal => "Signal",
            InterruptionCause::Timeout => "Timeout",
        }
    }
}

/// Aggregate status of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Passed,
    Failed,
    Interrupted(InterruptionCause),
}

impl From<InterruptionCause> for RunStatus {
    fn from(cause: InterruptionCause) -> Self {
        RunStatus::Interrupted(cause)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Passed => f.write_str("passed"),
            RunStatus::Failed => f.write_str("failed"),
            RunStatus::Interrupted(cause) => write!(f, "interruptedBy{}", cause.label()),
        }
    }
}

/// A `skip` or `todo` marker: unset, set, or set with a reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Marker {
    #[default]
    Off,
    On,
    Reason(String),
}

impl Marker {
    pub fn is_set(&self) -> bool {
        !matches!(self, Marker::Off)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Marker::Reason(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<bool> for Marker {
    fn from(value: bool) -> Self {
        if value { Marker::On } else { Marker::Off }
    }
}

impl From<&str> for Marker {
    fn from(reason: &str) -> Self {
        Marker::Reason(reason.to_string())
    }
}

impl From<String> for Marker {
    fn from(reason: String) -> Self {
        Marker::Reason(reason)
    }
}
