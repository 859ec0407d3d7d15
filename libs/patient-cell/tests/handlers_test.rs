use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;

use patient_cell::router::patient_routes;
use shared_store::ClinicStore;

fn test_app() -> Router {
    patient_routes(Arc::new(ClinicStore::default()))
}

fn post_patient(phone: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "first_name": "Ada",
                "last_name": "Moyo",
                "date_of_birth": "1990-04-12",
                "gender": "Female",
                "phone": phone
            })
            .to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn create_then_fetch_patient() {
    let app = test_app();

    let created = app.clone().oneshot(post_patient("555-2001")).await.unwrap();
    assert_eq!(created.status(), StatusCode::OK);

    let fetched = app
        .clone()
        .oneshot(Request::builder().uri("/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_phone_maps_to_conflict() {
    let app = test_app();

    let first = app.clone().oneshot(post_patient("555-2001")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(post_patient("555-2001")).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_patient_maps_to_not_found() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/42").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_birth_date_maps_to_bad_request() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "first_name": "Ada",
                "last_name": "Moyo",
                "date_of_birth": "12-04-1990",
                "gender": "Female",
                "phone": "555-2001"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_the_patient() {
    let app = test_app();

    app.clone().oneshot(post_patient("555-2001")).await.unwrap();

    let deleted = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = app
        .clone()
        .oneshot(Request::builder().uri("/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn explicit_null_clears_the_email() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "first_name": "Ada",
                "last_name": "Moyo",
                "date_of_birth": "1990-04-12",
                "gender": "Female",
                "phone": "555-2001",
                "email": "ada@example.test"
            })
            .to_string(),
        ))
        .unwrap();
    app.clone().oneshot(request).await.unwrap();

    // An update that omits the field leaves it unchanged.
    let untouched = app
        .clone()
        .oneshot(put_patient(json!({ "first_name": "Adaeze" })))
        .await
        .unwrap();
    assert_eq!(
        body_json(untouched).await["email"],
        json!("ada@example.test")
    );

    // An explicit null clears it.
    let cleared = app
        .clone()
        .oneshot(put_patient(json!({ "email": null })))
        .await
        .unwrap();
    assert!(body_json(cleared).await["email"].is_null());
}

fn put_patient(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/1")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
