use serde::Serialize;
use std::fmt;

/// Substring that marks a "no reply needed" classification, in lower case.
pub const NO_REPLY_SENTINEL: &str = "no reply";

/// Debug text some models echo after the reply; everything from here on is dropped.
pub const DRAFT_DEBUG_MARKER: &str = "Type of draft_result:";

/// The decider's label for an email, normalized to trimmed lower case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Classification(String);

impl Classification {
    pub fn new(raw: &str) -> Self {
        Classification(raw.trim().to_lowercase())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// False when the label contains the no-reply sentinel anywhere.
    pub fn requires_reply(&self) -> bool {
        !self.0.contains(NO_REPLY_SENTINEL)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cleans the drafter's output into the reply body.
///
/// Cuts at the first [`DRAFT_DEBUG_MARKER`] and trims. `None` when nothing
/// usable remains.
pub fn clean_draft(raw: &str) -> Option<String> {
    let text = match raw.find(DRAFT_DEBUG_MARKER) {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
