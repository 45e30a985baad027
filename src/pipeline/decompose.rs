use crate::models::{PipelineOutcome, StageResult, StageRole};

/// Marker searched for when splitting a combined blob, case-sensitive
pub const REVIEW_MARKER: &str = "Review";

/// Review text reported when no marker is found in a combined blob
pub const REVIEW_PLACEHOLDER: &str = "Review completed. See final output.";

/// Resolve stage output into named logical fields
///
/// Extraction strategies, first applicable wins:
/// 1. Per-stage attribution: each result's role maps directly to its field,
///    verbatim. Information-preserving, used whenever stage results exist.
/// 2. Label search: split a combined blob at the first occurrence of
///    "Review". Lossy; the verdict is not separately recoverable.
/// 3. No marker: the whole blob is the draft and the review is a fixed
///    placeholder.
///
/// Returns None when there is nothing to decompose (run failed before any
/// stage completed); callers report the run's failure instead.
pub fn decompose(stages: &[StageResult], final_blob: Option<&str>) -> Option<PipelineOutcome> {
    if !stages.is_empty() {
        return Some(attribute_stages(stages));
    }
    final_blob.map(split_blob)
}

fn attribute_stages(stages: &[StageResult]) -> PipelineOutcome {
    let mut outcome = PipelineOutcome::default();

    for stage in stages {
        let text = stage.raw_text.clone();
        match stage.role {
            StageRole::Writer => outcome.draft = text,
            StageRole::Reviewer => outcome.review = text,
            StageRole::ComplianceOfficer => outcome.verdict = text,
        }
    }

    if let Some(last) = stages.last() {
        outcome.final_text = last.raw_text.clone();
    }

    outcome
}

fn split_blob(blob: &str) -> PipelineOutcome {
    let (draft, review) = match blob.find(REVIEW_MARKER) {
        // Split on the first occurrence; which occurrence is "right" is a
        // known fragility of this path.
        Some(pos) => (
            blob[..pos].trim().to_string(),
            blob[pos..].trim().to_string(),
        ),
        None => (blob.to_string(), REVIEW_PLACEHOLDER.to_string()),
    };

    PipelineOutcome {
        draft,
        review,
        verdict: String::new(),
        final_text: blob.to_string(),
        lossy: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(role: StageRole, text: &str) -> StageResult {
        StageResult::new(role, text.to_string())
    }

    #[test]
    fn test_per_stage_attribution_is_verbatim() {
        let stages = vec![
            stage(StageRole::Writer, "A"),
            stage(StageRole::Reviewer, "B"),
            stage(StageRole::ComplianceOfficer, "C"),
        ];

        let outcome = decompose(&stages, None).expect("outcome");

        assert_eq!(outcome.draft, "A");
        assert_eq!(outcome.review, "B");
        assert_eq!(outcome.verdict, "C");
        assert_eq!(outcome.final_text, "C");
        assert!(!outcome.lossy);
    }

    #[test]
    fn test_attribution_wins_over_blob() {
        let stages = vec![stage(StageRole::Writer, "A"), stage(StageRole::Reviewer, "B")];

        let outcome = decompose(&stages, Some("ignored Review blob")).expect("outcome");

        assert_eq!(outcome.draft, "A");
        assert_eq!(outcome.review, "B");
        assert_eq!(outcome.verdict, "");
        assert_eq!(outcome.final_text, "B");
    }

    #[test]
    fn test_blob_splits_at_marker() {
        let outcome =
            decompose(&[], Some("Intro text. Review: APPROVED, good job.")).expect("outcome");

        assert_eq!(outcome.draft, "Intro text.");
        assert!(outcome.review.starts_with("Review: APPROVED"));
        assert_eq!(outcome.verdict, "");
        assert_eq!(outcome.final_text, "Intro text. Review: APPROVED, good job.");
        assert!(outcome.lossy);
    }

    #[test]
    fn test_blob_splits_at_first_marker_occurrence() {
        let outcome = decompose(&[], Some("Draft. Review one. Review two.")).expect("outcome");

        assert_eq!(outcome.draft, "Draft.");
        assert_eq!(outcome.review, "Review one. Review two.");
    }

    #[test]
    fn test_blob_without_marker_uses_placeholder() {
        let blob = "Just a post with no markers";
        let outcome = decompose(&[], Some(blob)).expect("outcome");

        assert_eq!(outcome.draft, blob);
        assert_eq!(outcome.review, REVIEW_PLACEHOLDER);
        assert_eq!(outcome.final_text, blob);
        assert!(outcome.lossy);
    }

    #[test]
    fn test_nothing_to_decompose() {
        assert!(decompose(&[], None).is_none());
    }

    #[test]
    fn test_decompose_is_idempotent() {
        let stages = vec![
            stage(StageRole::Writer, "A"),
            stage(StageRole::Reviewer, "B"),
        ];

        assert_eq!(decompose(&stages, None), decompose(&stages, None));

        let blob = Some("Intro. Review: fine.");
        assert_eq!(decompose(&[], blob), decompose(&[], blob));
    }
}
