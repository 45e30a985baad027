use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PipelineOutcome, PipelineRequest, StageResult};

/// Maximum length of a run name derived from the topic
const DERIVED_NAME_LEN: usize = 50;

/// Lifecycle of a run: Pending -> Running -> Completed | Failed
///
/// Completed and Failed are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// Field edits accepted by the update endpoint
///
/// A raw merge outside the pipeline's own state machine; it never touches
/// status, stages, or outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunPatch {
    pub name: Option<String>,
    pub topic: Option<String>,
    pub guidelines: Option<String>,
}

/// One end-to-end execution of the stage sequence for a single request
///
/// Owned by the task executing it; everyone else sees cloned snapshots.
/// The only mutations are status transitions, stage-result appends, outcome
/// attachment, and the explicit update merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: Uuid,
    pub name: String,
    pub request: PipelineRequest,
    pub status: RunStatus,
    pub stages: Vec<StageResult>,
    pub outcome: Option<PipelineOutcome>,
    pub error_detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineRun {
    /// Create a Pending run; the name defaults to a truncation of the topic
    pub fn new(request: PipelineRequest, name: Option<String>) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| request.topic.chars().take(DERIVED_NAME_LEN).collect());
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name,
            request,
            status: RunStatus::Pending,
            stages: Vec::new(),
            outcome: None,
            error_detail: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_running(&mut self) {
        if self.status == RunStatus::Pending {
            self.status = RunStatus::Running;
            self.touch();
        }
    }

    /// Record a completed stage; results are append-only
    pub fn push_stage(&mut self, result: StageResult) {
        self.stages.push(result);
        self.touch();
    }

    pub fn complete(&mut self, outcome: PipelineOutcome) {
        if self.status.is_terminal() {
            return;
        }
        self.status = RunStatus::Completed;
        self.outcome = Some(outcome);
        self.touch();
    }

    pub fn fail(&mut self, detail: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = RunStatus::Failed;
        self.error_detail = Some(detail.into());
        self.touch();
    }

    /// Apply an update merge, skipping absent and blank fields
    pub fn merge(&mut self, patch: &RunPatch) {
        if let Some(name) = non_blank(patch.name.as_deref()) {
            self.name = name;
        }
        if let Some(topic) = non_blank(patch.topic.as_deref()) {
            self.request.topic = topic;
        }
        if let Some(guidelines) = non_blank(patch.guidelines.as_deref()) {
            self.request.guidelines = guidelines;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageRole;

    fn request() -> PipelineRequest {
        PipelineRequest::new("The Future of Agentic AI", "Optimistic, no jargon").unwrap()
    }

    #[test]
    fn test_new_run_is_pending() {
        let run = PipelineRun::new(request(), None);

        assert_eq!(run.status, RunStatus::Pending);
        assert!(run.stages.is_empty());
        assert!(run.outcome.is_none());
        assert!(run.error_detail.is_none());
    }

    #[test]
    fn test_name_defaults_to_truncated_topic() {
        let long_topic = "x".repeat(80);
        let req = PipelineRequest::new(&long_topic, "g").unwrap();
        let run = PipelineRun::new(req, None);

        assert_eq!(run.name.len(), 50);

        let named = PipelineRun::new(request(), Some("Launch post".to_string()));
        assert_eq!(named.name, "Launch post");
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        let mut run = PipelineRun::new(request(), None);
        run.mark_running();
        run.fail("Creative Content Writer stage failed: timeout");

        assert_eq!(run.status, RunStatus::Failed);

        run.complete(PipelineOutcome::default());
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.outcome.is_none());
    }

    #[test]
    fn test_push_stage_preserves_order() {
        let mut run = PipelineRun::new(request(), None);
        run.mark_running();
        run.push_stage(StageResult::new(StageRole::Writer, "draft".to_string()));
        run.push_stage(StageResult::new(StageRole::Reviewer, "review".to_string()));

        let roles: Vec<StageRole> = run.stages.iter().map(|s| s.role).collect();
        assert_eq!(roles, vec![StageRole::Writer, StageRole::Reviewer]);
    }

    #[test]
    fn test_merge_skips_blank_fields() {
        let mut run = PipelineRun::new(request(), None);
        run.merge(&RunPatch {
            name: Some("Renamed".to_string()),
            topic: Some("   ".to_string()),
            guidelines: None,
        });

        assert_eq!(run.name, "Renamed");
        assert_eq!(run.request.topic, "The Future of Agentic AI");
    }
}
