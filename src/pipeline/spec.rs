use thiserror::Error;

use crate::llm::prompts;
use crate::models::StageRole;

/// Errors from assembling a custom stage list
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("{stage} depends on {dependency}, which is not produced earlier in the pipeline")]
    UnknownDependency {
        stage: StageRole,
        dependency: StageRole,
    },
    #[error("{0} appears more than once")]
    DuplicateRole(StageRole),
    #[error("pipeline has no stages")]
    Empty,
}

/// Static configuration for one stage: role, prompts, and which prior
/// stages' output is injected as context
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub role: StageRole,
    pub system_prompt: &'static str,
    pub task_template: &'static str,
    pub expected_output: &'static str,
    pub depends_on: &'static [StageRole],
}

impl StageSpec {
    pub fn writer() -> Self {
        Self {
            role: StageRole::Writer,
            system_prompt: prompts::WRITER_SYSTEM_PROMPT,
            task_template: prompts::WRITER_TASK_TEMPLATE,
            expected_output: prompts::WRITER_EXPECTED_OUTPUT,
            depends_on: &[],
        }
    }

    pub fn reviewer() -> Self {
        Self {
            role: StageRole::Reviewer,
            system_prompt: prompts::REVIEWER_SYSTEM_PROMPT,
            task_template: prompts::REVIEWER_TASK_TEMPLATE,
            expected_output: prompts::REVIEWER_EXPECTED_OUTPUT,
            depends_on: &[StageRole::Writer],
        }
    }

    pub fn compliance_officer() -> Self {
        Self {
            role: StageRole::ComplianceOfficer,
            system_prompt: prompts::COMPLIANCE_SYSTEM_PROMPT,
            task_template: prompts::COMPLIANCE_TASK_TEMPLATE,
            expected_output: prompts::COMPLIANCE_EXPECTED_OUTPUT,
            depends_on: &[StageRole::Writer, StageRole::Reviewer],
        }
    }
}

/// Ordered list of stages to execute
///
/// Construction guarantees every `depends_on` role is produced by an earlier
/// stage, so the runner never has to handle a missing dependency.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    stages: Vec<StageSpec>,
}

impl PipelineSpec {
    /// Validate and assemble a custom stage list
    pub fn new(stages: Vec<StageSpec>) -> Result<Self, SpecError> {
        if stages.is_empty() {
            return Err(SpecError::Empty);
        }

        let mut produced: Vec<StageRole> = Vec::with_capacity(stages.len());
        for stage in &stages {
            if produced.contains(&stage.role) {
                return Err(SpecError::DuplicateRole(stage.role));
            }
            for dep in stage.depends_on {
                if !produced.contains(dep) {
                    return Err(SpecError::UnknownDependency {
                        stage: stage.role,
                        dependency: *dep,
                    });
                }
            }
            produced.push(stage.role);
        }

        Ok(Self { stages })
    }

    /// Canonical pipeline: write, review, compliance-check
    pub fn standard() -> Self {
        Self {
            stages: vec![
                StageSpec::writer(),
                StageSpec::reviewer(),
                StageSpec::compliance_officer(),
            ],
        }
    }

    /// Reduced two-stage variant without the compliance check
    pub fn reduced() -> Self {
        Self {
            stages: vec![StageSpec::writer(), StageSpec::reviewer()],
        }
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_pipeline_order() {
        let spec = PipelineSpec::standard();
        let roles: Vec<StageRole> = spec.stages().iter().map(|s| s.role).collect();

        assert_eq!(
            roles,
            vec![
                StageRole::Writer,
                StageRole::Reviewer,
                StageRole::ComplianceOfficer
            ]
        );
    }

    #[test]
    fn test_reduced_pipeline_omits_compliance() {
        let spec = PipelineSpec::reduced();
        assert_eq!(spec.stage_count(), 2);
        assert!(
            spec.stages()
                .iter()
                .all(|s| s.role != StageRole::ComplianceOfficer)
        );
    }

    #[test]
    fn test_canonical_stage_lists_validate() {
        assert!(
            PipelineSpec::new(vec![
                StageSpec::writer(),
                StageSpec::reviewer(),
                StageSpec::compliance_officer()
            ])
            .is_ok()
        );
        assert!(PipelineSpec::new(vec![StageSpec::writer(), StageSpec::reviewer()]).is_ok());
    }

    #[test]
    fn test_dependency_before_producer_rejected() {
        let err = PipelineSpec::new(vec![StageSpec::reviewer(), StageSpec::writer()]).unwrap_err();

        assert_eq!(
            err,
            SpecError::UnknownDependency {
                stage: StageRole::Reviewer,
                dependency: StageRole::Writer,
            }
        );
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let err =
            PipelineSpec::new(vec![StageSpec::writer(), StageSpec::writer()]).unwrap_err();
        assert_eq!(err, SpecError::DuplicateRole(StageRole::Writer));
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        assert_eq!(PipelineSpec::new(vec![]).unwrap_err(), SpecError::Empty);
    }
}
