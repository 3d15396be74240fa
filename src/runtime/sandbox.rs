//! Subprocess sandbox for replaying session programs.
//!
//! A program is the workspace binding preamble plus the full session history.
//! It is written to a temporary script and handed to a Python interpreter in
//! a child process, so an exception in executed code can never take the host
//! down with it. The child's exit status is the success signal: CPython exits
//! nonzero on an uncaught exception and leaves the formatted traceback on
//! stderr.

use crate::core::{Config, Error, Result};
use crate::runtime::capture::tee;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Capability to execute an arbitrary source program with captured output.
///
/// The seam between the session and the interpreter it drives. Production
/// code uses [`PythonSandbox`]; tests substitute
/// [`crate::testing::MockSandbox`].
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Execute `program` to completion and return its captured output.
    ///
    /// An exception raised *inside* the program is not an `Err`: it comes
    /// back as an unsuccessful [`ProgramOutput`]. `Err` is reserved for the
    /// sandbox itself failing (spawn failure, IO trouble, deadline expiry).
    async fn execute(&self, program: &str) -> Result<ProgramOutput>;
}

/// Raw output of one sandboxed program run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error (the traceback, when `success` is false)
    pub stderr: String,
    /// Whether the interpreter exited cleanly
    pub success: bool,
}

/// Executes programs with a local Python interpreter
#[derive(Debug, Clone)]
pub struct PythonSandbox {
    config: Config,
}

impl PythonSandbox {
    /// Create a sandbox, verifying that the configured interpreter exists.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        which::which(&config.python_bin).map_err(|err| {
            Error::configuration(format!(
                "python interpreter '{}' not found: {err}",
                config.python_bin
            ))
        })?;

        Ok(Self { config })
    }

    /// The configuration this sandbox was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn write_script(program: &str) -> Result<tempfile::NamedTempFile> {
        let mut script = tempfile::Builder::new()
            .prefix("polybrain-")
            .suffix(".py")
            .tempfile()?;
        script.write_all(program.as_bytes())?;
        script.flush()?;
        Ok(script)
    }
}

#[async_trait]
impl Sandbox for PythonSandbox {
    async fn execute(&self, program: &str) -> Result<ProgramOutput> {
        // The script handle must stay alive until the child has exited.
        let script = Self::write_script(program)?;

        debug!(
            interpreter = %self.config.python_bin,
            bytes = program.len(),
            "executing program"
        );

        let mut child = Command::new(&self.config.python_bin)
            .arg(script.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                Error::sandbox(format!(
                    "failed to spawn '{}': {err}",
                    self.config.python_bin
                ))
            })?;

        let child_stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::sandbox("child stdout was not piped"))?;
        let child_stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::sandbox("child stderr was not piped"))?;

        // Drain both pipes concurrently with the wait so a chatty program
        // cannot deadlock on a full pipe buffer.
        let echo = self.config.echo_output;
        let stdout_task =
            tokio::spawn(async move { tee(child_stdout, echo.then(tokio::io::stdout)).await });
        let stderr_task =
            tokio::spawn(async move { tee(child_stderr, echo.then(tokio::io::stderr)).await });

        let status = match self.config.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait()).await {
                    Ok(waited) => waited?,
                    Err(_) => {
                        warn!(secs, "execution deadline expired, killing interpreter");
                        child.start_kill().ok();
                        let _ = child.wait().await;
                        let _ = stdout_task.await;
                        let _ = stderr_task.await;
                        return Err(Error::Timeout(secs));
                    }
                }
            }
            None => child.wait().await?,
        };

        let stdout = stdout_task.await??;
        let stderr = stderr_task.await??;

        debug!(
            success = status.success(),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "program finished"
        );

        Ok(ProgramOutput {
            stdout,
            stderr,
            success: status.success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_sandbox() -> Option<PythonSandbox> {
        let config = Config::builder().echo_output(false).build().unwrap();
        match PythonSandbox::new(config) {
            Ok(sandbox) => Some(sandbox),
            Err(_) => {
                eprintln!("python3 not on PATH, skipping sandbox test");
                None
            }
        }
    }

    #[test]
    fn test_missing_interpreter_is_a_configuration_error() {
        let config = Config::builder()
            .python_bin("definitely-not-a-real-python")
            .build()
            .unwrap();
        let err = PythonSandbox::new(config).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_clean_program_reports_success() {
        let Some(sandbox) = quiet_sandbox() else { return };

        let output = sandbox.execute("print('hi')").await.unwrap();
        assert!(output.success);
        assert_eq!(output.stdout, "hi\n");
        assert_eq!(output.stderr, "");
    }

    #[tokio::test]
    async fn test_raising_program_reports_traceback() {
        let Some(sandbox) = quiet_sandbox() else { return };

        let output = sandbox
            .execute("print('before')\nraise ValueError('bad')")
            .await
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.stdout, "before\n");
        assert!(output.stderr.contains("ValueError"));
        assert!(output.stderr.contains("bad"));
    }

    #[tokio::test]
    async fn test_deadline_expiry_returns_timeout() {
        let config = Config::builder()
            .echo_output(false)
            .timeout_secs(1)
            .build()
            .unwrap();
        let Ok(sandbox) = PythonSandbox::new(config) else {
            eprintln!("python3 not on PATH, skipping sandbox test");
            return;
        };

        let err = sandbox
            .execute("import time\ntime.sleep(30)")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(1)));
    }
}
