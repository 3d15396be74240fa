//! Fragment preparation for LLM-authored code.
//!
//! Model responses arrive as markdown and routinely try to re-create the
//! environment the session already provides. Callers run both functions here
//! before handing a fragment to [`crate::runtime::Interpreter::run`]:
//! [`strip_code_fences`] to pull the Python out of the markdown, and
//! [`guard_fragment`] to reject code that would re-import the CAD API or
//! shadow the live `partstudio` binding.

use crate::core::error::{Error, Result};

const FENCE: &str = "```";

/// Extract Python source from a markdown-formatted model response.
///
/// Fenced blocks (```` ``` ````, ```` ```py ````, ```` ```python ````) are
/// concatenated in order; prose between them is dropped. An unterminated
/// final fence is tolerated. Input without any fence is assumed to already be
/// bare code and is returned trimmed.
pub fn strip_code_fences(raw: &str) -> String {
    if !raw.contains(FENCE) {
        return raw.trim().to_string();
    }

    let mut normalized = raw.replace("```python", FENCE).replace("```py", FENCE);

    let boundaries = normalized.matches(FENCE).count();
    if boundaries % 2 != 0 {
        normalized.push_str("\n```");
    }

    normalized
        .split(FENCE)
        .enumerate()
        .filter(|(i, _)| i % 2 != 0)
        .map(|(_, block)| block.trim())
        .filter(|block| !block.is_empty())
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Reject fragments that try to rebuild the execution environment.
///
/// The replay environment already imports the CAD API and binds the live
/// part studio as `partstudio`; a fragment that does either again would fail
/// at runtime or detach the session from its document. The returned message
/// is descriptive on purpose: it goes straight back to the model, which is
/// expected to correct itself.
pub fn guard_fragment(fragment: &str) -> Result<()> {
    if fragment.contains("import onpy") || fragment.contains("from onpy") {
        return Err(Error::rejected_fragment(
            "onpy is already imported in this session; do not import it again",
        ));
    }

    if fragment.contains("get_document(") {
        return Err(Error::rejected_fragment(
            "the session already holds a live document; do not call get_document",
        ));
    }

    if rebinds_partstudio(fragment) {
        return Err(Error::rejected_fragment(
            "a partstudio object is already defined; do not rebind it",
        ));
    }

    Ok(())
}

/// Prepare a raw model response for execution: strip fences, then guard.
pub fn prepare_fragment(raw: &str) -> Result<String> {
    let fragment = strip_code_fences(raw);
    guard_fragment(&fragment)?;
    Ok(fragment)
}

fn rebinds_partstudio(fragment: &str) -> bool {
    fragment.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed
            .strip_prefix("partstudio")
            .map(|rest| rest.trim_start().starts_with('='))
            .unwrap_or(false)
    })
}
