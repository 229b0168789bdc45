//! HTTP API route definitions.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ErrorResponse;
use crate::model::{CreateLabTest, CreateSample, CreateSampleTest, LabTestUpdate, SampleUpdate};

use super::handlers::{
    self, health, ready, render_metrics, AppState, LabTestResponse, MessageResponse,
    SampleResponse,
};

/// OpenAPI document for the resource endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_sample,
        handlers::list_samples,
        handlers::get_sample,
        handlers::update_sample,
        handlers::delete_sample,
        handlers::create_test,
        handlers::list_tests,
        handlers::create_test_for_sample,
        handlers::list_tests_for_sample,
        handlers::update_test,
    ),
    components(schemas(
        CreateSample,
        SampleUpdate,
        CreateLabTest,
        CreateSampleTest,
        LabTestUpdate,
        SampleResponse,
        LabTestResponse,
        MessageResponse,
        ErrorResponse,
    )),
    tags(
        (name = "samples", description = "Laboratory specimen records"),
        (name = "tests", description = "Lab test result records"),
    )
)]
pub struct ApiDoc;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(render_metrics))
        // Sample endpoints
        .route(
            "/samples/",
            post(handlers::create_sample).get(handlers::list_samples),
        )
        .route(
            "/samples/:sample_id",
            get(handlers::get_sample)
                .put(handlers::update_sample)
                .delete(handlers::delete_sample),
        )
        // Test endpoints
        .route(
            "/tests/",
            post(handlers::create_test).get(handlers::list_tests),
        )
        .route(
            "/samples/:sample_id/tests",
            post(handlers::create_test_for_sample).get(handlers::list_tests_for_sample),
        )
        .route(
            "/samples/:sample_id/tests/:test_type",
            put(handlers::update_test),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Unrestricted CORS: any origin, method, and header.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_503_when_not_ready() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_200_when_ready() {
        let state = test_state();
        state.set_ready(true);
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_404_without_recorder() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn collection_routes_require_trailing_slash() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/samples")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/samples/")
                    .header("origin", "https://lab.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|v| v.to_str().unwrap()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
