//! API integration tests against a running server
//!
//! Start the server first (the memory backend is enough):
//! `CHAIRTIME_STORAGE__BACKEND=memory CHAIRTIME_STORAGE__BARBERS=Ana,Leo cargo run`

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Same weekday next week, well inside the booking window
fn next_week() -> String {
    (Utc::now().date_naive() + Duration::days(7))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_book_then_cancel() {
    let client = Client::new();
    let date = next_week();

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&json!({
            "date": date,
            "time": "11:00",
            "customer_name": "Integration",
            "customer_phone": "0612345678"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let booking: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(booking["status"], "confirmed");
    let id = booking["id"].as_str().expect("No id in response");

    let response = client
        .patch(format!("{}/bookings/{}/status", BASE_URL, id))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // A second cancel is not a valid transition
    let response = client
        .patch(format!("{}/bookings/{}/status", BASE_URL, id))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "INVALID_STATUS_TRANSITION");
}

#[tokio::test]
#[ignore]
async fn test_past_date_rejected() {
    let client = Client::new();
    let yesterday = (Utc::now().date_naive() - Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .json(&json!({
            "date": yesterday,
            "time": "10:00",
            "customer_name": "Integration",
            "customer_phone": "0612345678"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "PAST_DATE");
}

#[tokio::test]
#[ignore]
async fn test_availability_range() {
    let client = Client::new();
    let today = Utc::now().date_naive();
    let end = today + Duration::days(6);

    let response = client
        .get(format!("{}/availability", BASE_URL))
        .query(&[
            ("start_date", today.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
        ])
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().map(|days| days.len()), Some(7));
}

#[tokio::test]
#[ignore]
async fn test_join_and_leave_queue() {
    let client = Client::new();

    let response = client
        .post(format!("{}/queue/join", BASE_URL))
        .json(&json!({
            "customer_name": "Walk-in",
            "customer_phone": "0612345678"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let entry: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(entry["status"], "waiting");
    assert!(entry["position"].as_i64().unwrap_or(0) >= 1);
    let id = entry["id"].as_str().expect("No id in response");

    let response = client
        .post(format!("{}/queue/{}/leave", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/wait-time", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let summary: Value = response.json().await.expect("Failed to parse response");
    assert!(summary["current_wait_minutes"].as_i64().unwrap_or(-1) >= 0);
}
