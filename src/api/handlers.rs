//! HTTP API handlers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorResponse};
use crate::metrics;
use crate::model::{
    new_sample_id, CreateLabTest, CreateSample, CreateSampleTest, LabTest, LabTestUpdate, Sample,
    SampleUpdate,
};
use crate::store::LabStore;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend behind the trait seam.
    pub store: Arc<dyn LabStore>,
    /// Whether the startup connectivity check has succeeded.
    pub ready: Arc<AtomicBool>,
    /// Prometheus exposition handle, when the recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state around a store.
    pub fn new(store: Arc<dyn LabStore>) -> Self {
        Self {
            store,
            ready: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the /metrics endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether the database connectivity check has succeeded.
    pub ready: bool,
}

/// Sample record as serialized to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct SampleResponse {
    /// Storage identifier as a hex string.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Server-generated business identifier.
    pub sample_id: String,
    /// Name of the patient.
    pub patient_name: String,
    /// Lab metadata.
    pub lab_info: HashMap<String, String>,
    /// Free-text description, null when absent.
    pub description: Option<String>,
}

impl From<Sample> for SampleResponse {
    fn from(sample: Sample) -> Self {
        Self {
            id: sample.id.map(|id| id.to_hex()),
            sample_id: sample.sample_id,
            patient_name: sample.patient_name,
            lab_info: sample.lab_info,
            description: sample.description,
        }
    }
}

/// Test record as serialized to clients. Optional fields that were never
/// provided are omitted, mirroring the stored shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct LabTestResponse {
    /// Storage identifier as a hex string.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Business identifier of the associated sample.
    pub sample_id: String,
    /// Type of the test.
    pub test_type: String,
    /// Result of the test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Units of the test result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl From<LabTest> for LabTestResponse {
    fn from(test: LabTest) -> Self {
        Self {
            id: test.id.map(|id| id.to_hex()),
            sample_id: test.sample_id,
            test_type: test.test_type,
            result: test.result,
            units: test.units,
        }
    }
}

/// Acknowledgment body for delete operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Short confirmation message.
    pub message: String,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 once the startup connectivity
/// check has succeeded, 503 before.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let response = ReadyResponse { ready: is_ready };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Prometheus metrics exposition handler.
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Create a sample. The business identifier is generated here; any value
/// the client supplied is discarded.
#[utoipa::path(
    post,
    path = "/samples/",
    tag = "samples",
    request_body = CreateSample,
    responses(
        (status = 201, description = "Sample stored", body = SampleResponse)
    )
)]
pub async fn create_sample(
    State(state): State<AppState>,
    Json(body): Json<CreateSample>,
) -> Result<(StatusCode, Json<SampleResponse>), ApiError> {
    let sample = Sample {
        id: None,
        sample_id: new_sample_id(),
        patient_name: body.patient_name,
        lab_info: body.lab_info,
        description: body.description,
    };

    let stored = state.store.insert_sample(sample).await?;
    metrics::inc_samples_created();

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// List all samples.
#[utoipa::path(
    get,
    path = "/samples/",
    tag = "samples",
    responses(
        (status = 200, description = "All stored samples", body = [SampleResponse])
    )
)]
pub async fn list_samples(
    State(state): State<AppState>,
) -> Result<Json<Vec<SampleResponse>>, ApiError> {
    let samples = state.store.list_samples().await?;
    Ok(Json(samples.into_iter().map(Into::into).collect()))
}

/// Get a sample by business identifier.
#[utoipa::path(
    get,
    path = "/samples/{sample_id}",
    tag = "samples",
    params(("sample_id" = String, Path, description = "Business identifier of the sample")),
    responses(
        (status = 200, description = "The matching sample", body = SampleResponse),
        (status = 404, description = "No sample matches", body = ErrorResponse)
    )
)]
pub async fn get_sample(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
) -> Result<Json<SampleResponse>, ApiError> {
    let sample = state
        .store
        .find_sample(&sample_id)
        .await?
        .ok_or(ApiError::SampleNotFound { sample_id })?;

    Ok(Json(sample.into()))
}

/// Merge the fields present in the request into an existing sample.
#[utoipa::path(
    put,
    path = "/samples/{sample_id}",
    tag = "samples",
    params(("sample_id" = String, Path, description = "Business identifier of the sample")),
    request_body = SampleUpdate,
    responses(
        (status = 200, description = "The updated sample", body = SampleResponse),
        (status = 404, description = "No sample matches", body = ErrorResponse)
    )
)]
pub async fn update_sample(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
    Json(update): Json<SampleUpdate>,
) -> Result<Json<SampleResponse>, ApiError> {
    let sample = state
        .store
        .update_sample(&sample_id, &update)
        .await?
        .ok_or(ApiError::SampleNotFound { sample_id })?;
    metrics::inc_samples_updated();

    Ok(Json(sample.into()))
}

/// Delete a sample by business identifier. Associated tests are kept.
#[utoipa::path(
    delete,
    path = "/samples/{sample_id}",
    tag = "samples",
    params(("sample_id" = String, Path, description = "Business identifier of the sample")),
    responses(
        (status = 200, description = "Sample removed", body = MessageResponse),
        (status = 404, description = "No sample matches", body = ErrorResponse)
    )
)]
pub async fn delete_sample(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_sample(&sample_id).await? {
        return Err(ApiError::SampleNotFound { sample_id });
    }
    metrics::inc_samples_deleted();

    Ok(Json(MessageResponse {
        message: "sample deleted successfully".to_string(),
    }))
}

/// Create a test via the standalone route.
#[utoipa::path(
    post,
    path = "/tests/",
    tag = "tests",
    request_body = CreateLabTest,
    responses(
        (status = 200, description = "Test stored", body = LabTestResponse)
    )
)]
pub async fn create_test(
    State(state): State<AppState>,
    Json(body): Json<CreateLabTest>,
) -> Result<Json<LabTestResponse>, ApiError> {
    let test = LabTest {
        id: None,
        sample_id: body.sample_id,
        test_type: body.test_type,
        result: body.result,
        units: body.units,
    };

    let stored = state.store.insert_test(test).await?;
    metrics::inc_tests_created();

    Ok(Json(stored.into()))
}

/// List all tests.
#[utoipa::path(
    get,
    path = "/tests/",
    tag = "tests",
    responses(
        (status = 200, description = "All stored tests", body = [LabTestResponse])
    )
)]
pub async fn list_tests(
    State(state): State<AppState>,
) -> Result<Json<Vec<LabTestResponse>>, ApiError> {
    let tests = state.store.list_tests().await?;
    Ok(Json(tests.into_iter().map(Into::into).collect()))
}

/// Create a test under a sample path. The path value always wins over any
/// `sample_id` in the body.
#[utoipa::path(
    post,
    path = "/samples/{sample_id}/tests",
    tag = "tests",
    params(("sample_id" = String, Path, description = "Business identifier of the sample")),
    request_body = CreateSampleTest,
    responses(
        (status = 200, description = "Test stored", body = LabTestResponse)
    )
)]
pub async fn create_test_for_sample(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
    Json(body): Json<CreateSampleTest>,
) -> Result<Json<LabTestResponse>, ApiError> {
    let test = LabTest {
        id: None,
        sample_id,
        test_type: body.test_type,
        result: body.result,
        units: body.units,
    };

    let stored = state.store.insert_test(test).await?;
    metrics::inc_tests_created();

    Ok(Json(stored.into()))
}

/// List the tests recorded for one sample.
#[utoipa::path(
    get,
    path = "/samples/{sample_id}/tests",
    tag = "tests",
    params(("sample_id" = String, Path, description = "Business identifier of the sample")),
    responses(
        (status = 200, description = "Tests for the sample", body = [LabTestResponse])
    )
)]
pub async fn list_tests_for_sample(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
) -> Result<Json<Vec<LabTestResponse>>, ApiError> {
    let tests = state.store.list_tests_for_sample(&sample_id).await?;
    Ok(Json(tests.into_iter().map(Into::into).collect()))
}

/// Merge the fields present in the request into the first test matching
/// the (sample, type) compound key.
#[utoipa::path(
    put,
    path = "/samples/{sample_id}/tests/{test_type}",
    tag = "tests",
    params(
        ("sample_id" = String, Path, description = "Business identifier of the sample"),
        ("test_type" = String, Path, description = "Type of the test")
    ),
    request_body = LabTestUpdate,
    responses(
        (status = 200, description = "The updated test", body = LabTestResponse),
        (status = 404, description = "No test matches", body = ErrorResponse)
    )
)]
pub async fn update_test(
    State(state): State<AppState>,
    Path((sample_id, test_type)): Path<(String, String)>,
    Json(update): Json<LabTestUpdate>,
) -> Result<Json<LabTestResponse>, ApiError> {
    let test = state
        .store
        .update_test(&sample_id, &test_type, &update)
        .await?
        .ok_or(ApiError::TestNotFound {
            sample_id,
            test_type,
        })?;
    metrics::inc_tests_updated();

    Ok(Json(test.into()))
}
