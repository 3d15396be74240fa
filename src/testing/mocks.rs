//! Mock implementations of the session's collaborators
//!
//! This module provides:
//! - [`MockSandbox`]: a scriptable [`Sandbox`] that records every program it
//!   is asked to execute
//! - [`StubWorkspace`]: a [`Workspace`] whose preamble needs no CAD system,
//!   with a wipe-call counter

use crate::core::{Error, Result};
use crate::runtime::{ProgramOutput, Sandbox, Workspace};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scriptable sandbox for engine tests.
///
/// Responses are queued and consumed in order; once the queue is empty every
/// execution reports a clean run with no output. All executed programs are
/// recorded for inspection.
#[derive(Default)]
pub struct MockSandbox {
    programs: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Result<ProgramOutput>>>,
}

impl MockSandbox {
    /// Create a mock sandbox that reports clean, silent runs
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a clean run with the given stdout
    pub fn push_ok(&self, stdout: impl Into<String>) {
        self.push_response(Ok(ProgramOutput {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }));
    }

    /// Queue a run that raised, with partial stdout and a traceback
    pub fn push_failure(&self, stdout: impl Into<String>, stderr: impl Into<String>) {
        self.push_response(Ok(ProgramOutput {
            stdout: stdout.into(),
            stderr: stderr.into(),
            success: false,
        }));
    }

    /// Queue a sandbox-level error
    pub fn push_error(&self, error: Error) {
        self.push_response(Err(error));
    }

    /// Queue an arbitrary response
    pub fn push_response(&self, response: Result<ProgramOutput>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Every program executed so far, in order
    pub fn programs(&self) -> Vec<String> {
        self.programs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sandbox for MockSandbox {
    async fn execute(&self, program: &str) -> Result<ProgramOutput> {
        self.programs.lock().unwrap().push(program.to_string());

        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(ProgramOutput {
                stdout: String::new(),
                stderr: String::new(),
                success: true,
            }),
        }
    }
}

/// Workspace stand-in with no CAD system behind it.
#[derive(Debug)]
pub struct StubWorkspace {
    preamble: String,
    wipe_calls: AtomicUsize,
}

impl StubWorkspace {
    /// A stub whose preamble is pure Python: it defines a `partstudio`
    /// object whose methods are no-ops, so recorded histories (including the
    /// leading wipe fragment) replay under a real interpreter.
    pub fn pure_python() -> Self {
        Self::with_preamble(concat!(
            "class _PartStudio:\n",
            "    def wipe(self):\n",
            "        pass\n",
            "partstudio = _PartStudio()",
        ))
    }

    /// A stub with a custom binding preamble
    pub fn with_preamble(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            wipe_calls: AtomicUsize::new(0),
        }
    }

    /// How many times `wipe` has been called
    pub fn wipe_count(&self) -> usize {
        self.wipe_calls.load(Ordering::SeqCst)
    }
}

impl Default for StubWorkspace {
    fn default() -> Self {
        Self::pure_python()
    }
}

#[async_trait]
impl Workspace for StubWorkspace {
    fn binding_preamble(&self) -> String {
        self.preamble.clone()
    }

    async fn wipe(&self) -> Result<()> {
        self.wipe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
