use serde::{Deserialize, Serialize};

/// Named logical fields decomposed from a completed run
///
/// Derived read-only from the run's stage results (or from a single combined
/// text blob when per-stage outputs are unavailable).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub draft: String,
    pub review: String,
    pub verdict: String,
    pub final_text: String,
    /// Set when the draft/review split had to be recovered from a single
    /// blob of text and may not match the true stage boundaries
    pub lossy: bool,
}
