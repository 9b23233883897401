//! HTTP behavior tests for the bank client adapter, against a mock bank.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paybridge_client::{BankClient, ClientError, ClientOptions};
use paybridge_core::{Amount, Direction, LegId, LegStatus, PrepareRequest};

fn prepare_request() -> PrepareRequest {
    PrepareRequest {
        account_number: "b64-ciphertext".into(),
        direction: Direction::Withdrawal,
        amount_cents: Amount::from_cents(30_000).unwrap(),
        idempotency_key: "key-123".into(),
    }
}

#[tokio::test]
async fn prepare_sends_api_key_and_decodes_response() {
    let server = MockServer::start().await;
    let leg_id = LegId::generate();

    Mock::given(method("POST"))
        .and(path("/v1/transactions/prepare"))
        .and(header("x-api-key", "cib-key"))
        .and(body_partial_json(json!({
            "direction": "WITHDRAWAL",
            "amount_cents": 30_000,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": leg_id.to_string(),
            "status": "PREPARED",
            "message": "leg prepared",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let response = client.prepare(&prepare_request()).await.unwrap();

    assert_eq!(response.transaction_id, leg_id);
    assert_eq!(response.status, LegStatus::Prepared);
}

#[tokio::test]
async fn commit_addresses_leg_by_id() {
    let server = MockServer::start().await;
    let leg_id = LegId::generate();

    Mock::given(method("POST"))
        .and(path(format!("/v1/transactions/{leg_id}/commit")))
        .and(header("x-api-key", "cib-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": leg_id.to_string(),
            "status": "COMMITTED",
            "message": "leg committed",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let response = client.commit(leg_id).await.unwrap();
    assert_eq!(response.status, LegStatus::Committed);
}

#[tokio::test]
async fn aborted_commit_is_a_response_not_an_error() {
    // A bank that recovers a commit failure locally reports the terminal
    // status in a 2xx body; the caller decides what to do with it.
    let server = MockServer::start().await;
    let leg_id = LegId::generate();

    Mock::given(method("POST"))
        .and(path(format!("/v1/transactions/{leg_id}/commit")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction_id": leg_id.to_string(),
            "status": "ABORTED",
            "message": "insufficient funds",
        })))
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let response = client.commit(leg_id).await.unwrap();
    assert_eq!(response.status, LegStatus::Aborted);
    assert_eq!(response.message, "insufficient funds");
}

#[tokio::test]
async fn not_found_envelope_maps_to_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/transactions/prepare"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": "not_found",
                "message": "account not found",
            }
        })))
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let err = client.prepare(&prepare_request()).await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound { .. }));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn invalid_state_envelope_maps_to_typed_error() {
    let server = MockServer::start().await;
    let leg_id = LegId::generate();

    Mock::given(method("POST"))
        .and(path(format!("/v1/transactions/{leg_id}/commit")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": "invalid_state",
                "message": "transaction is not prepared for commit",
            }
        })))
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let err = client.commit(leg_id).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidState { .. }));
}

#[tokio::test]
async fn insufficient_funds_envelope_carries_figures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts/balance"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "error": {
                "code": "insufficient_funds",
                "message": "insufficient funds",
                "details": { "balance": 100, "required": 300 }
            }
        })))
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let err = client.get_balance("b64-ciphertext").await.unwrap_err();

    match err {
        ClientError::InsufficientFunds { balance, required } => {
            assert_eq!(balance, 100);
            assert_eq!(required, 300);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_envelope_maps_to_typed_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "unauthorized", "message": "unauthorized" }
        })))
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "wrong-key");
    let err = client.list_accounts().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn non_json_error_body_degrades_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/transactions/prepare"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let err = client.prepare(&prepare_request()).await.unwrap_err();

    match err {
        ClientError::Api { code, status, .. } => {
            assert_eq!(code, "unknown");
            assert_eq!(status, 502);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn slow_bank_times_out_as_transport_error() {
    let server = MockServer::start().await;
    let leg_id = LegId::generate();

    Mock::given(method("POST"))
        .and(path(format!("/v1/transactions/{leg_id}/commit")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({
                    "transaction_id": leg_id.to_string(),
                    "status": "COMMITTED",
                    "message": "too late",
                })),
        )
        .mount(&server)
        .await;

    let client = BankClient::with_options(
        server.uri(),
        "cib-key",
        ClientOptions::with_timeout(Duration::from_millis(100)),
    );
    let err = client.commit(leg_id).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn balance_response_decodes_amount() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts/balance"))
        .and(body_partial_json(json!({ "account_number": "b64" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "balance_cents": 70_000 })),
        )
        .mount(&server)
        .await;

    let client = BankClient::new(server.uri(), "cib-key");
    let balance = client.get_balance("b64").await.unwrap();
    assert_eq!(balance.cents(), 70_000);
}
