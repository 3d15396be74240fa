//! Result payloads returned to callers of the execution engine.

use serde::{Deserialize, Serialize};

/// Outcome of one attempted fragment execution.
///
/// Always carries the stdout produced by replaying the full session history;
/// `error` is populated only when the replay raised. An empty `stdout` with
/// `error: None` is a legitimate clean run that printed nothing, which is why
/// the error channel is an `Option` rather than an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Captured standard output of the full replay
    pub stdout: String,

    /// Formatted interpreter traceback, present only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// Outcome of a clean run
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            error: None,
        }
    }

    /// Outcome of a run that raised, with whatever stdout it produced first
    pub fn failed(stdout: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            error: Some(trace.into()),
        }
    }

    /// Whether the fragment was committed to the session history
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}
