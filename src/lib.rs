//! Session-scoped Python execution for LLM-driven CAD modeling
//!
//! `polybrain` is the execution core of the Polybrain assistant: an LLM agent
//! writes small Python fragments against a CAD scripting API, and this crate
//! runs them against a live part studio while keeping the session replayable.
//!
//! Every session owns a growing text buffer of previously-accepted fragments.
//! On each turn the *entire* buffer, plus the new fragment, is replayed inside
//! a Python subprocess whose environment binds the live part studio under the
//! `partstudio` name. A clean run commits the fragment; a raised exception
//! discards it and hands the captured traceback back to the caller, so the
//! agent can try again. The buffer is therefore always sufficient to rebuild
//! the workspace from scratch.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use polybrain::{Config, Interpreter, OnshapeWorkspace, PythonSandbox};
//!
//! # #[tokio::main]
//! # async fn main() -> polybrain::Result<()> {
//! let sandbox = Arc::new(PythonSandbox::new(Config::default())?);
//! let workspace = Arc::new(OnshapeWorkspace::connect(
//!     "d69e6ca6abae839540c3da27",
//!     sandbox.clone(),
//! )?);
//!
//! let mut session = Interpreter::new(workspace, sandbox);
//! let outcome = session.run("print('hello from the part studio')").await?;
//! assert!(outcome.success());
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `cli` — interactive REPL binary (`polybrain`) plus its clap/colored
//!   dependencies. Disabled by default.

pub mod core;
pub mod runtime;
pub mod testing;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types at the crate root
pub use crate::core::{Config, ConfigBuilder, Error, ExecutionOutcome, Result};
pub use crate::runtime::{
    Interpreter, OnshapeWorkspace, ProgramOutput, PythonSandbox, Sandbox, Workspace,
    WIPE_FRAGMENT,
};

/// Crate version, surfaced for log banners
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
