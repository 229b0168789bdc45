//! Integration tests exercising the HTTP API end to end.
//!
//! These run the real router against the in-memory store, so no MongoDB
//! server is required.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use lab_track::api::{create_router, AppState};
use lab_track::store::{MemoryConfig, MemoryStore};

/// Build an app over an empty in-memory store.
fn app() -> Router {
    create_router(AppState::new(Arc::new(MemoryStore::new())))
}

/// Build an app whose store fails every operation.
fn failing_app() -> Router {
    let store = MemoryStore::with_config(MemoryConfig {
        fail_ops: true,
        ..Default::default()
    });
    create_router(AppState::new(Arc::new(store)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a sample and return its response body.
async fn create_sample(app: &Router, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/samples/", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn create_sample_generates_identifier_server_side() {
    let app = app();

    let created = create_sample(
        &app,
        json!({
            "sample_id": "forged",
            "patient_name": "Jane Doe",
            "lab_info": {"cbc": "pending"}
        }),
    )
    .await;

    let sample_id = created["sample_id"].as_str().unwrap();
    assert_ne!(sample_id, "forged");
    assert_eq!(sample_id.len(), 24);
    assert!(created["_id"].is_string());
    assert_eq!(created["patient_name"], "Jane Doe");
    assert_eq!(created["lab_info"], json!({"cbc": "pending"}));
    assert!(created["description"].is_null());
}

#[tokio::test]
async fn created_sample_round_trips_through_get() {
    let app = app();

    let created = create_sample(
        &app,
        json!({
            "patient_name": "Jane Doe",
            "lab_info": {"cbc": "pending", "lipid": "ordered"},
            "description": "fasting draw"
        }),
    )
    .await;

    let sample_id = created["sample_id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(get(&format!("/samples/{}", sample_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(response).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn list_samples_returns_all_records() {
    let app = app();
    create_sample(&app, json!({"patient_name": "Jane Doe", "lab_info": {}})).await;
    create_sample(&app, json!({"patient_name": "John Roe", "lab_info": {}})).await;

    let response = app.clone().oneshot(get("/samples/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let samples = body_json(response).await;
    assert_eq!(samples.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn get_missing_sample_returns_404() {
    let app = app();

    let response = app.clone().oneshot(get("/samples/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "sample missing not found");
}

#[tokio::test]
async fn partial_update_leaves_unspecified_fields_untouched() {
    let app = app();
    let created = create_sample(
        &app,
        json!({"patient_name": "Jane Doe", "lab_info": {"cbc": "pending"}}),
    )
    .await;
    let sample_id = created["sample_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/samples/{}", sample_id),
            json!({"description": "urgent"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["description"], "urgent");
    assert_eq!(updated["patient_name"], "Jane Doe");
    assert_eq!(updated["lab_info"], json!({"cbc": "pending"}));

    // The merge is persisted, not just echoed.
    let response = app
        .clone()
        .oneshot(get(&format!("/samples/{}", sample_id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, updated);
}

#[tokio::test]
async fn empty_update_returns_record_unchanged() {
    let app = app();
    let created = create_sample(
        &app,
        json!({"patient_name": "Jane Doe", "lab_info": {"cbc": "pending"}}),
    )
    .await;
    let sample_id = created["sample_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/samples/{}", sample_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[tokio::test]
async fn update_missing_sample_returns_404() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/samples/missing",
            json!({"description": "urgent"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_sample_permanently() {
    let app = app();
    let created = create_sample(&app, json!({"patient_name": "Jane Doe", "lab_info": {}})).await;
    let sample_id = created["sample_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(delete(&format!("/samples/{}", sample_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "sample deleted successfully"
    );

    let response = app
        .clone()
        .oneshot(get(&format!("/samples/{}", sample_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_sample_returns_404() {
    let app = app();

    let response = app.clone().oneshot(delete("/samples/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_test_persists_only_provided_fields() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tests/",
            json!({"sample_id": "s-1", "test_type": "cbc"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    assert_eq!(created["sample_id"], "s-1");
    assert_eq!(created["test_type"], "cbc");
    let obj = created.as_object().unwrap();
    assert!(!obj.contains_key("result"));
    assert!(!obj.contains_key("units"));
}

#[tokio::test]
async fn nested_test_create_takes_sample_id_from_path() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/samples/from-path/tests",
            json!({"sample_id": "from-body", "test_type": "cbc", "result": "5.1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    assert_eq!(created["sample_id"], "from-path");
    assert_eq!(created["result"], "5.1");
}

#[tokio::test]
async fn list_tests_filters_by_sample_path() {
    let app = app();

    for (sample_id, test_type) in [("s-1", "cbc"), ("s-1", "lipid"), ("s-2", "cbc")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/tests/",
                json!({"sample_id": sample_id, "test_type": test_type}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/tests/")).await.unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

    let response = app.clone().oneshot(get("/samples/s-1/tests")).await.unwrap();
    let tests = body_json(response).await;
    assert_eq!(tests.as_array().unwrap().len(), 2);
    for test in tests.as_array().unwrap() {
        assert_eq!(test["sample_id"], "s-1");
    }
}

#[tokio::test]
async fn update_test_merges_by_compound_key() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tests/",
            json!({"sample_id": "s-1", "test_type": "cbc", "result": "pending"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/samples/s-1/tests/cbc",
            json!({"result": "5.1", "units": "10^9/L"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["sample_id"], "s-1");
    assert_eq!(updated["test_type"], "cbc");
    assert_eq!(updated["result"], "5.1");
    assert_eq!(updated["units"], "10^9/L");
}

#[tokio::test]
async fn update_missing_test_returns_404() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/samples/s-1/tests/cbc",
            json!({"result": "5.1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "test cbc for sample s-1 not found"
    );
}

#[tokio::test]
async fn deleting_a_sample_keeps_its_tests() {
    let app = app();
    let created = create_sample(&app, json!({"patient_name": "Jane Doe", "lab_info": {}})).await;
    let sample_id = created["sample_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/samples/{}/tests", sample_id),
            json!({"test_type": "cbc"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(delete(&format!("/samples/{}", sample_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get(&format!("/samples/{}/tests", sample_id)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_create_payload_is_rejected() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/samples/", json!({"lab_info": {}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn store_failure_surfaces_as_500_with_json_body() {
    let app = failing_app();

    let response = app.clone().oneshot(get("/samples/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("database error"));
}
