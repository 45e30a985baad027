//! HTTP endpoints for submitting and reading pipeline runs.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::llm::{AnthropicClient, AnthropicConfig, TextGenerator};
use crate::models::{PipelineRequest, PipelineRun, RunPatch};
use crate::pipeline::PipelineSpec;
use crate::service::RunService;

#[derive(Debug, Deserialize)]
pub struct CreateRun {
    pub topic: String,
    pub guidelines: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Per-request credential; falls back to the server's configured key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Run the reduced two-stage pipeline without the compliance check
    #[serde(default)]
    pub skip_compliance: bool,
}

/// POST /api/runs
/// Validate the request and start a run; returns before generation finishes
pub async fn create_run(
    State(service): State<Arc<RunService>>,
    Json(req): Json<CreateRun>,
) -> ApiResult<Json<PipelineRun>> {
    let request = PipelineRequest::new(&req.topic, &req.guidelines)?;
    let spec = if req.skip_compliance {
        PipelineSpec::reduced()
    } else {
        PipelineSpec::standard()
    };

    let generator = req
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| {
            Arc::new(AnthropicClient::new(AnthropicConfig::with_api_key(
                key.to_string(),
            ))) as Arc<dyn TextGenerator>
        });

    let run = service.submit(request, req.name, spec, generator)?;
    Ok(Json(run))
}

/// GET /api/runs
pub async fn list_runs(State(service): State<Arc<RunService>>) -> Json<Vec<PipelineRun>> {
    Json(service.list())
}

/// GET /api/runs/{id}
pub async fn get_run(
    State(service): State<Arc<RunService>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PipelineRun>> {
    tracing::debug!("Getting run: {}", id);

    let run = service
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("Run {} not found", id)))?;
    Ok(Json(run))
}

/// PUT /api/runs/{id}
/// Merge editable fields into a run record
pub async fn update_run(
    State(service): State<Arc<RunService>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RunPatch>,
) -> ApiResult<Json<PipelineRun>> {
    let run = service
        .update(id, &patch)
        .ok_or_else(|| ApiError::NotFound(format!("Run {} not found", id)))?;
    Ok(Json(run))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_run_optional_fields_default() {
        let json = r#"{"topic":"AI","guidelines":"friendly"}"#;
        let req: CreateRun = serde_json::from_str(json).unwrap();

        assert!(req.name.is_none());
        assert!(req.api_key.is_none());
        assert!(!req.skip_compliance);
    }
}
