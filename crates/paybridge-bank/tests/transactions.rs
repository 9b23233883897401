//! Participant protocol integration tests over HTTP.

mod common;

use common::{TestHarness, API_KEY};
use serde_json::{json, Value};

async fn prepare(harness: &TestHarness, account: &str, direction: &str, amount: i64) -> Value {
    let response = harness
        .server
        .post("/v1/transactions/prepare")
        .add_header("x-api-key", API_KEY)
        .json(&json!({
            "account_number": harness.encrypt(account),
            "direction": direction,
            "amount_cents": amount,
            "idempotency_key": ulid::Ulid::new().to_string(),
        }))
        .await;

    response.assert_status_ok();
    response.json()
}

// ============================================================================
// Prepare
// ============================================================================

#[tokio::test]
async fn prepare_returns_prepared_leg_without_touching_balance() {
    let harness = TestHarness::new();

    let body = prepare(&harness, "1001", "WITHDRAWAL", 30_000).await;

    assert_eq!(body["status"], "PREPARED");
    assert!(body["transaction_id"].is_string());
    assert_eq!(harness.balance("1001").await, 100_000);
}

#[tokio::test]
async fn prepare_unknown_account_returns_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/transactions/prepare")
        .add_header("x-api-key", API_KEY)
        .json(&json!({
            "account_number": harness.encrypt("9999"),
            "direction": "DEPOSIT",
            "amount_cents": 100,
            "idempotency_key": "key-unknown-account",
        }))
        .await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn prepare_requires_api_key() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/transactions/prepare")
        .json(&json!({
            "account_number": harness.encrypt("1001"),
            "direction": "DEPOSIT",
            "amount_cents": 100,
            "idempotency_key": "key-no-auth",
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn prepare_rejects_wrong_api_key() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/transactions/prepare")
        .add_header("x-api-key", "wrong-key")
        .json(&json!({
            "account_number": harness.encrypt("1001"),
            "direction": "DEPOSIT",
            "amount_cents": 100,
            "idempotency_key": "key-bad-auth",
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn prepare_with_same_idempotency_key_returns_same_leg() {
    let harness = TestHarness::new();
    let request = json!({
        "account_number": harness.encrypt("1001"),
        "direction": "WITHDRAWAL",
        "amount_cents": 30_000,
        "idempotency_key": "retry-key-1",
    });

    let first: Value = harness
        .server
        .post("/v1/transactions/prepare")
        .add_header("x-api-key", API_KEY)
        .json(&request)
        .await
        .json();
    let second: Value = harness
        .server
        .post("/v1/transactions/prepare")
        .add_header("x-api-key", API_KEY)
        .json(&request)
        .await
        .json();

    assert_eq!(first["transaction_id"], second["transaction_id"]);
}

// ============================================================================
// Commit
// ============================================================================

#[tokio::test]
async fn commit_applies_withdrawal() {
    let harness = TestHarness::new();
    let prepared = prepare(&harness, "1001", "WITHDRAWAL", 30_000).await;
    let id = prepared["transaction_id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/v1/transactions/{id}/commit"))
        .add_header("x-api-key", API_KEY)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "COMMITTED");
    assert_eq!(harness.balance("1001").await, 70_000);
}

#[tokio::test]
async fn commit_applies_deposit() {
    let harness = TestHarness::new();
    let prepared = prepare(&harness, "1002", "DEPOSIT", 30_000).await;
    let id = prepared["transaction_id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/v1/transactions/{id}/commit"))
        .add_header("x-api-key", API_KEY)
        .await;

    response.assert_status_ok();
    assert_eq!(harness.balance("1002").await, 80_000);
}

#[tokio::test]
async fn double_commit_is_rejected_without_double_apply() {
    let harness = TestHarness::new();
    let prepared = prepare(&harness, "1001", "WITHDRAWAL", 30_000).await;
    let id = prepared["transaction_id"].as_str().unwrap();

    harness
        .server
        .post(&format!("/v1/transactions/{id}/commit"))
        .add_header("x-api-key", API_KEY)
        .await
        .assert_status_ok();

    let second = harness
        .server
        .post(&format!("/v1/transactions/{id}/commit"))
        .add_header("x-api-key", API_KEY)
        .await;

    second.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = second.json();
    assert_eq!(body["error"]["code"], "invalid_state");
    assert_eq!(harness.balance("1001").await, 70_000);
}

#[tokio::test]
async fn insufficient_funds_commit_reports_aborted() {
    let harness = TestHarness::new();
    let prepared = prepare(&harness, "1002", "WITHDRAWAL", 500_000).await;
    let id = prepared["transaction_id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/v1/transactions/{id}/commit"))
        .add_header("x-api-key", API_KEY)
        .await;

    // Recovered locally: terminal status in the body, not an HTTP error.
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ABORTED");
    assert_eq!(harness.balance("1002").await, 50_000);
}

#[tokio::test]
async fn commit_unknown_transaction_returns_not_found() {
    let harness = TestHarness::new();
    let id = paybridge_core::LegId::generate();

    let response = harness
        .server
        .post(&format!("/v1/transactions/{id}/commit"))
        .add_header("x-api-key", API_KEY)
        .await;

    response.assert_status_not_found();
}

// ============================================================================
// Rollback
// ============================================================================

#[tokio::test]
async fn rollback_of_prepared_leg_is_a_noop_on_balance() {
    let harness = TestHarness::new();
    let prepared = prepare(&harness, "1001", "WITHDRAWAL", 30_000).await;
    let id = prepared["transaction_id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/v1/transactions/{id}/rollback"))
        .add_header("x-api-key", API_KEY)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ROLLED_BACK");
    assert_eq!(harness.balance("1001").await, 100_000);
}

#[tokio::test]
async fn rollback_of_committed_leg_restores_balance() {
    let harness = TestHarness::new();
    let prepared = prepare(&harness, "1001", "WITHDRAWAL", 30_000).await;
    let id = prepared["transaction_id"].as_str().unwrap();

    harness
        .server
        .post(&format!("/v1/transactions/{id}/commit"))
        .add_header("x-api-key", API_KEY)
        .await
        .assert_status_ok();
    assert_eq!(harness.balance("1001").await, 70_000);

    let response = harness
        .server
        .post(&format!("/v1/transactions/{id}/rollback"))
        .add_header("x-api-key", API_KEY)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ROLLED_BACK");
    assert_eq!(harness.balance("1001").await, 100_000);
}

#[tokio::test]
async fn repeated_rollback_stays_rolled_back() {
    let harness = TestHarness::new();
    let prepared = prepare(&harness, "1001", "WITHDRAWAL", 30_000).await;
    let id = prepared["transaction_id"].as_str().unwrap();

    for _ in 0..2 {
        let response = harness
            .server
            .post(&format!("/v1/transactions/{id}/rollback"))
            .add_header("x-api-key", API_KEY)
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ROLLED_BACK");
    }

    assert_eq!(harness.balance("1001").await, 100_000);
}
