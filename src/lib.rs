pub mod api;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod service;

pub use api::create_router;
pub use llm::{AnthropicClient, AnthropicConfig, GenerationError, TextGenerator};
pub use models::{
    PipelineOutcome, PipelineRequest, PipelineRun, RunPatch, RunStatus, StageResult, StageRole,
    ValidationError,
};
pub use pipeline::{
    PipelineExecution, PipelineSpec, RunnerConfig, SpecError, StageSpec, decompose, run_pipeline,
};
pub use registry::RunRegistry;
pub use service::RunService;
