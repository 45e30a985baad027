use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::TextGenerator;
use crate::models::{PipelineRequest, PipelineRun, RunPatch, ValidationError};
use crate::pipeline::{PipelineSpec, RunnerConfig, decompose, run_pipeline};
use crate::registry::RunRegistry;

/// Submission and status surface over the run registry
///
/// Owns the registry and the default generation client. Submitting returns
/// immediately with the Pending run; the pipeline executes on a spawned
/// task, so status reads never block on in-flight generation.
pub struct RunService {
    registry: Arc<RunRegistry>,
    generator: Option<Arc<dyn TextGenerator>>,
    runner: RunnerConfig,
}

impl RunService {
    /// `generator` is the process-wide default; None means every submission
    /// must carry its own credential override
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, runner: RunnerConfig) -> Self {
        Self {
            registry: Arc::new(RunRegistry::new()),
            generator,
            runner,
        }
    }

    /// Accept a run and start executing it in the background
    ///
    /// Returns the Pending run snapshot. Fails synchronously only on
    /// validation grounds; generation failures are observable through
    /// status reads.
    pub fn submit(
        &self,
        request: PipelineRequest,
        name: Option<String>,
        spec: PipelineSpec,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Result<PipelineRun, ValidationError> {
        let generator = generator
            .or_else(|| self.generator.clone())
            .ok_or(ValidationError::MissingApiKey)?;

        let run = PipelineRun::new(request.clone(), name);
        let id = run.id;
        self.registry.insert(run.clone());

        let registry = Arc::clone(&self.registry);
        let config = self.runner.clone();
        tokio::spawn(async move {
            execute_run(registry, generator, spec, config, id, request).await;
        });

        info!("Accepted run {} ({})", run.id, run.name);
        Ok(run)
    }

    pub fn get(&self, id: Uuid) -> Option<PipelineRun> {
        self.registry.get(id)
    }

    pub fn list(&self) -> Vec<PipelineRun> {
        self.registry.list()
    }

    /// Apply an update merge to a run's editable fields
    pub fn update(&self, id: Uuid, patch: &RunPatch) -> Option<PipelineRun> {
        self.registry.update(id, |run| run.merge(patch))
    }
}

async fn execute_run(
    registry: Arc<RunRegistry>,
    generator: Arc<dyn TextGenerator>,
    spec: PipelineSpec,
    config: RunnerConfig,
    id: Uuid,
    request: PipelineRequest,
) {
    registry.update(id, |run| run.mark_running());

    let execution = run_pipeline(generator.as_ref(), &spec, &request, &config, |result| {
        let result = result.clone();
        registry.update(id, |run| run.push_stage(result));
    })
    .await;

    match execution.failure {
        None => match decompose(&execution.stages, None) {
            Some(outcome) => {
                info!("Run {} completed ({} stages)", id, execution.stages.len());
                registry.update(id, |run| run.complete(outcome));
            }
            None => {
                registry.update(id, |run| run.fail("pipeline produced no stage output"));
            }
        },
        Some(failure) => {
            warn!("Run {} failed: {}", id, failure.detail());
            registry.update(id, |run| run.fail(failure.detail()));
        }
    }
}
