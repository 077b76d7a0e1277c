//! Router tests: requests go through the full axum stack without a socket

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chairtime_server::{api, config::BookingConfig, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let h = common::harness(BookingConfig::default(), 2).await;
    api::create_router(AppState {
        services: Arc::new(h.services),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn booking(date: &str, time: &str) -> Value {
    json!({
        "date": date,
        "time": time,
        "customer_name": "Robin",
        "customer_phone": "0612345678"
    })
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_and_fetch_booking() {
    let app = app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/v1/bookings",
        Some(booking("2025-11-20", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "confirmed");
    assert_eq!(created["duration_minutes"], 30);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/v1/bookings/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);

    let (status, listed) = send(&app, "GET", "/api/v1/bookings?date=2025-11-20", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(|b| b.len()), Some(1));

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/v1/bookings/{}/status", id),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
}

#[tokio::test]
async fn test_error_bodies_carry_kind() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/bookings",
        Some(booking("20/11/2025", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_DATE_FORMAT");
    assert_eq!(body["code"], 100);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/bookings",
        Some(booking("2025-11-18", "10:00")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "PAST_DATE");

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/bookings",
            Some(booking("2025-11-20", "11:00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/bookings",
        Some(booking("2025-11-20", "11:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SLOT_FULL");

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/bookings/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_availability_endpoints() {
    let app = app().await;

    let (status, slots) = send(&app, "GET", "/api/v1/availability/2025-11-20", None).await;
    assert_eq!(status, StatusCode::OK);
    let slots = slots.as_array().unwrap();
    // 09:00 to 17:30 every 30 minutes
    assert_eq!(slots.len(), 18);
    assert_eq!(slots[0]["time"], "09:00:00");
    assert_eq!(slots[0]["status"], "available");

    let (status, days) = send(
        &app,
        "GET",
        "/api/v1/availability?start_date=2025-11-19&end_date=2025-11-25",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[1]["total_available_spots"], 36);
    assert_eq!(days[1]["status"], "available");

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/availability?start_date=2025-11-25&end_date=2025-11-19",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_queue_endpoints() {
    let app = app().await;

    let (status, entry) = send(
        &app,
        "POST",
        "/api/v1/queue/join",
        Some(json!({ "customer_name": "Kai", "customer_phone": "0612345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["position"], 1);
    assert_eq!(entry["estimated_wait_minutes"], 0);

    let (status, queue) = send(&app, "GET", "/api/v1/queue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().map(|q| q.len()), Some(1));

    let (status, summary) = send(&app, "GET", "/api/v1/wait-time", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["queue_length"], 1);
    assert_eq!(summary["active_barber_count"], 2);
    assert_eq!(summary["current_wait_minutes"], 0);

    let id = entry["id"].as_str().unwrap();
    let (status, _) = send(&app, "POST", &format!("/api/v1/queue/{}/leave", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "POST", &format!("/api/v1/queue/{}/leave", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_STATUS_TRANSITION");

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/v1/queue/00000000-0000-0000-0000-000000000000/status",
        Some(json!({ "status": "in_service" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "QUEUE_ENTRY_NOT_FOUND");
}
