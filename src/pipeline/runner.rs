use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::llm::{GenerationError, TextGenerator, build_task_prompt};
use crate::models::{PipelineRequest, StageResult, StageRole};
use crate::pipeline::PipelineSpec;

/// Configuration for the stage runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Deadline for a single generation call; exceeding it fails the run
    pub stage_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            stage_timeout: Duration::from_secs(120),
        }
    }
}

/// Role and provider error of the stage that aborted a run
#[derive(Debug, Clone)]
pub struct StageFailure {
    pub role: StageRole,
    pub message: String,
}

impl StageFailure {
    /// Error detail recorded on the failed run
    pub fn detail(&self) -> String {
        format!("{} stage failed: {}", self.role, self.message)
    }
}

/// Everything the runner produced: the full stage sequence on success, the
/// partial sequence plus the failure otherwise
#[derive(Debug)]
pub struct PipelineExecution {
    pub stages: Vec<StageResult>,
    pub failure: Option<StageFailure>,
}

impl PipelineExecution {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Execute the stages in order, feeding each stage the labeled output of the
/// stages it depends on
///
/// Exactly one generation call per stage. The first failure (provider error,
/// timeout, or empty text) aborts the remaining stages; completed results
/// are kept. No retries at this level. `on_stage` fires after each stage so
/// the caller can expose partial progress.
pub async fn run_pipeline(
    generator: &dyn TextGenerator,
    spec: &PipelineSpec,
    request: &PipelineRequest,
    config: &RunnerConfig,
    mut on_stage: impl FnMut(&StageResult),
) -> PipelineExecution {
    let mut stages: Vec<StageResult> = Vec::with_capacity(spec.stage_count());

    for stage in spec.stages() {
        let context: Vec<&StageResult> = stage
            .depends_on
            .iter()
            .filter_map(|dep| stages.iter().find(|s| s.role == *dep))
            .collect();
        let user_prompt = build_task_prompt(stage.task_template, request, &context);

        debug!(
            "Dispatching {} stage ({} context sections)",
            stage.role,
            context.len()
        );

        let generated = timeout(
            config.stage_timeout,
            generator.generate(stage.system_prompt, &user_prompt, stage.expected_output),
        )
        .await;

        let text = match generated {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => return failed(stages, stage.role, err),
            Err(_) => {
                return failed(
                    stages,
                    stage.role,
                    GenerationError::TimedOut(config.stage_timeout),
                );
            }
        };

        if text.trim().is_empty() {
            return failed(stages, stage.role, GenerationError::EmptyResponse);
        }

        let result = StageResult::new(stage.role, text);
        info!(
            "{} stage complete ({} chars)",
            result.role,
            result.raw_text.len()
        );
        on_stage(&result);
        stages.push(result);
    }

    PipelineExecution {
        stages,
        failure: None,
    }
}

fn failed(stages: Vec<StageResult>, role: StageRole, err: GenerationError) -> PipelineExecution {
    warn!("{} stage failed: {}", role, err);
    PipelineExecution {
        stages,
        failure: Some(StageFailure {
            role,
            message: err.to_string(),
        }),
    }
}
