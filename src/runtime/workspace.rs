//! The workspace seam: a live CAD document driven by the session.

use crate::core::{Error, Result};
use crate::runtime::sandbox::Sandbox;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// The fragment that clears a part studio. Every session history begins with
/// it, so a full replay always rebuilds the document from empty.
pub const WIPE_FRAGMENT: &str = "partstudio.wipe()";

/// Handle to a live CAD document/part-studio.
///
/// The session treats the workspace as an opaque capability: it can produce
/// the Python that binds the live part studio into an execution environment,
/// and it can be wiped back to empty. Everything else the executed fragments
/// do to it is between them and the CAD system.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Python that binds the live part studio under the conventional
    /// `partstudio` name. Prepended to every replay.
    fn binding_preamble(&self) -> String;

    /// Restore the document to an empty state.
    async fn wipe(&self) -> Result<()>;
}

/// A live Onshape part studio, addressed by document id and driven through
/// the Python `onpy` client.
pub struct OnshapeWorkspace {
    document_id: String,
    sandbox: Arc<dyn Sandbox>,
}

impl OnshapeWorkspace {
    /// Attach to an Onshape document.
    ///
    /// The id is interpolated into generated Python source, so anything but
    /// a plain alphanumeric identifier is refused outright.
    pub fn connect(document_id: impl Into<String>, sandbox: Arc<dyn Sandbox>) -> Result<Self> {
        let document_id = document_id.into();

        if document_id.is_empty() || !document_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::configuration(format!(
                "invalid document id '{document_id}': expected an alphanumeric Onshape id"
            )));
        }

        Ok(Self {
            document_id,
            sandbox,
        })
    }

    /// The Onshape document this workspace is attached to
    pub fn document_id(&self) -> &str {
        &self.document_id
    }
}

#[async_trait]
impl Workspace for OnshapeWorkspace {
    fn binding_preamble(&self) -> String {
        format!(
            "import onpy\npartstudio = onpy.get_document(\"{}\").get_partstudio()",
            self.document_id
        )
    }

    async fn wipe(&self) -> Result<()> {
        info!(document = %self.document_id, "wiping part studio");

        let program = format!("{}\n{}", self.binding_preamble(), WIPE_FRAGMENT);
        let output = self.sandbox.execute(&program).await?;

        if output.success {
            Ok(())
        } else {
            Err(Error::workspace(format!(
                "wipe failed for document {}: {}",
                self.document_id,
                output.stderr.trim()
            )))
        }
    }
}
