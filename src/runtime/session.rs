//! The code-execution session: replayable history against a live workspace.
//!
//! A session accepts one fragment at a time. Each attempt replays the whole
//! accumulated history (plus the candidate fragment) from a wiped document,
//! so the workspace state is always derivable from the session's text buffer
//! alone. That buys a strong guarantee at a known cost: committed fragments
//! visibly re-apply their side effects on every turn, and total work grows
//! quadratically over a long session. The CAD handle offers no fine-grained
//! undo, which makes wipe-and-replay the only honest option.
//!
//! `run` and `reset` take `&mut self`, so a session can never have two
//! executions in flight. Callers that share a session across tasks serialize
//! through whatever owns the exclusive reference.

use crate::core::{ExecutionOutcome, Result};
use crate::runtime::sandbox::Sandbox;
use crate::runtime::workspace::{Workspace, WIPE_FRAGMENT};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A persistent Python execution session bound to one CAD document.
///
/// # Examples
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use polybrain::{Config, Interpreter, OnshapeWorkspace, PythonSandbox};
/// # #[tokio::main]
/// # async fn main() -> polybrain::Result<()> {
/// let sandbox = Arc::new(PythonSandbox::new(Config::default())?);
/// let workspace = Arc::new(OnshapeWorkspace::connect("d69e6ca6", sandbox.clone())?);
/// let mut session = Interpreter::new(workspace, sandbox);
///
/// let outcome = session.run("sketch = partstudio.add_sketch(\
///     plane=partstudio.features.front_plane)").await?;
/// if let Some(trace) = &outcome.error {
///     eprintln!("fragment discarded:\n{trace}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Interpreter {
    id: Uuid,
    created_at: DateTime<Utc>,
    workspace: Arc<dyn Workspace>,
    sandbox: Arc<dyn Sandbox>,
    history: String,
    poisoned: bool,
}

impl Interpreter {
    /// Create a session against a workspace. The history starts as the wipe
    /// fragment, so the first replay begins from an empty document.
    pub fn new(workspace: Arc<dyn Workspace>, sandbox: Arc<dyn Sandbox>) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "created execution session");

        Self {
            id,
            created_at: Utc::now(),
            workspace,
            sandbox,
            history: WIPE_FRAGMENT.to_string(),
            poisoned: false,
        }
    }

    /// Unique id of this session, for log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When this session was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The accumulated source history. Replaying this from an empty
    /// workspace reproduces the current document state.
    pub fn history(&self) -> &str {
        &self.history
    }

    /// Whether an interrupted execution has left the workspace out of sync
    /// with the history. A poisoned session refuses to run until reset.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Attempt a fragment: replay the full history plus `fragment` against
    /// the workspace, committing the fragment only if the replay is clean.
    ///
    /// On a clean replay the fragment joins the history and the captured
    /// stdout is returned. If the replay raises, the history is left exactly
    /// as it was and the outcome carries the traceback next to whatever
    /// stdout was produced first — enough signal for the model to send a
    /// corrected fragment.
    ///
    /// `Err` is reserved for the collaborators themselves failing; a fatal
    /// collaborator error poisons the session because the workspace may hold
    /// partial side effects the history knows nothing about.
    pub async fn run(&mut self, fragment: &str) -> Result<ExecutionOutcome> {
        if self.poisoned {
            return Err(crate::core::Error::PoisonedSession);
        }

        let candidate = format!("{}\n{}", self.history, fragment);
        let program = format!("{}\n{}", self.workspace.binding_preamble(), candidate);

        debug!(
            session = %self.id,
            fragment_bytes = fragment.len(),
            history_bytes = self.history.len(),
            "replaying session"
        );

        let output = match self.sandbox.execute(&program).await {
            Ok(output) => output,
            Err(err) => {
                if err.is_fatal() {
                    warn!(session = %self.id, %err, "fatal sandbox error, poisoning session");
                    self.poisoned = true;
                }
                return Err(err);
            }
        };

        if output.success {
            self.history = candidate;
            Ok(ExecutionOutcome::ok(output.stdout))
        } else {
            debug!(session = %self.id, "replay raised, fragment discarded");
            Ok(ExecutionOutcome::failed(output.stdout, output.stderr))
        }
    }

    /// Wipe the workspace and restore the history to the wipe fragment.
    ///
    /// Observably idempotent: a second consecutive reset leaves history and
    /// workspace exactly as the first did. A failed wipe propagates and the
    /// session keeps its previous state; treat that as fatal and recreate
    /// the session.
    pub async fn reset(&mut self) -> Result<()> {
        info!(session = %self.id, "resetting session");

        self.workspace.wipe().await?;
        self.history.clear();
        self.history.push_str(WIPE_FRAGMENT);
        self.poisoned = false;

        Ok(())
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("history_bytes", &self.history.len())
            .field("poisoned", &self.poisoned)
            .finish()
    }
}
