//! End-to-end transfer tests: a real PSP surface in front of two real bank
//! services listening on ephemeral ports.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use serde_json::{json, Value};

use paybridge_bank::{BankConfig, AppState as BankAppState};
use paybridge_core::{AccountCipher, AccountNumber, Amount};
use paybridge_ledger::{Account, Ledger};
use paybridge_psp::{
    create_router, AppState, BankDirectory, BankEndpoint, MirrorSeed, MirrorStore, PspConfig,
    TransferCoordinator,
};

const SECRET: &str = "e2e-shared-secret";
const CIB_KEY: &str = "cib-api-key";
const NBE_KEY: &str = "nbe-api-key";

/// Spawn a bank service on an ephemeral port; returns its base URL and
/// ledger (for direct balance assertions and mid-test manipulation).
async fn spawn_bank(name: &str, api_key: &str, accounts: &[(&str, i64)]) -> (String, Arc<Ledger>) {
    let ledger = Arc::new(Ledger::new());
    for (number, balance) in accounts {
        ledger
            .insert_account(Account::new(
                AccountNumber::new(*number).unwrap(),
                Amount::from_cents(*balance).unwrap(),
            ))
            .unwrap();
    }

    let config = BankConfig {
        bank_name: name.into(),
        listen_addr: "127.0.0.1:0".into(),
        api_key: api_key.into(),
        encryption_secret: SECRET.into(),
        seed_accounts_path: None,
        max_body_bytes: 64 * 1024,
        request_timeout_seconds: 30,
    };

    let state = BankAppState::new(Arc::clone(&ledger), config);
    let router = paybridge_bank::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (base_url, ledger)
}

fn mirror_seeds() -> Vec<MirrorSeed> {
    vec![
        MirrorSeed {
            account_number: AccountNumber::new("1001").unwrap(),
            bank: "CIB".into(),
            owner: "farid".into(),
            balance_cents: Amount::from_cents(100_000).unwrap(),
        },
        MirrorSeed {
            account_number: AccountNumber::new("2001").unwrap(),
            bank: "NBE".into(),
            owner: "nadia".into(),
            balance_cents: Amount::from_cents(50_000).unwrap(),
        },
    ]
}

/// Build the PSP surface pointed at the given bank base URLs.
fn psp_server(cib_url: &str, nbe_url: &str) -> TestServer {
    let endpoints = vec![
        BankEndpoint {
            name: "CIB".into(),
            base_url: cib_url.into(),
            api_key: CIB_KEY.into(),
        },
        BankEndpoint {
            name: "NBE".into(),
            base_url: nbe_url.into(),
            api_key: NBE_KEY.into(),
        },
    ];

    let mirror = MirrorStore::from_seeds(mirror_seeds()).unwrap();
    let banks = BankDirectory::from_endpoints(&endpoints, Duration::from_secs(2));
    let coordinator = Arc::new(TransferCoordinator::new(
        mirror,
        banks,
        AccountCipher::new(SECRET),
        Duration::from_secs(5),
    ));

    let config = PspConfig {
        listen_addr: "127.0.0.1:0".into(),
        encryption_secret: SECRET.into(),
        banks: endpoints,
        ..PspConfig::default()
    };

    let state = AppState::new(coordinator, config);
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

async fn balance(ledger: &Ledger, number: &str) -> i64 {
    ledger
        .balance_of(&AccountNumber::new(number).unwrap())
        .await
        .unwrap()
        .cents()
}

fn transfer_body(amount: i64) -> Value {
    json!({
        "source_account_number": "1001",
        "destination_account_number": "2001",
        "amount_cents": amount,
    })
}

#[tokio::test]
async fn successful_transfer_moves_money_and_conserves_the_sum() {
    let (cib_url, cib_ledger) = spawn_bank("CIB", CIB_KEY, &[("1001", 100_000)]).await;
    let (nbe_url, nbe_ledger) = spawn_bank("NBE", NBE_KEY, &[("2001", 50_000)]).await;
    let psp = psp_server(&cib_url, &nbe_url);

    let response = psp
        .post("/v1/transfers")
        .add_header("x-caller-id", "farid")
        .json(&transfer_body(30_000))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "SUCCESS");
    assert!(body["transfer_id"].is_string());

    // 1000.00 / 500.00 with a 300.00 transfer ends 700.00 / 800.00.
    assert_eq!(balance(&cib_ledger, "1001").await, 70_000);
    assert_eq!(balance(&nbe_ledger, "2001").await, 80_000);
    assert_eq!(
        balance(&cib_ledger, "1001").await + balance(&nbe_ledger, "2001").await,
        150_000
    );

    // The PSP's mirror was refreshed from the authoritative balances.
    let accounts: Value = psp
        .get("/v1/accounts")
        .add_header("x-caller-id", "farid")
        .await
        .json();
    assert_eq!(accounts["accounts"][0]["balance_cents"], 70_000);

    // Both parties see the transfer in their history.
    let history: Value = psp
        .get("/v1/transfers")
        .add_header("x-caller-id", "nadia")
        .await
        .json();
    assert_eq!(history["transfers"][0]["status"], "SUCCESS");
}

#[tokio::test]
async fn insufficient_local_balance_rejects_before_contacting_banks() {
    let (cib_url, cib_ledger) = spawn_bank("CIB", CIB_KEY, &[("1001", 100_000)]).await;
    let (nbe_url, nbe_ledger) = spawn_bank("NBE", NBE_KEY, &[("2001", 50_000)]).await;
    let psp = psp_server(&cib_url, &nbe_url);

    let response = psp
        .post("/v1/transfers")
        .add_header("x-caller-id", "farid")
        .json(&transfer_body(300_000))
        .await;

    response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_funds");
    assert_eq!(body["error"]["details"]["status"], "FAILED");

    // No bank was contacted; both ledgers untouched.
    assert_eq!(balance(&cib_ledger, "1001").await, 100_000);
    assert_eq!(balance(&nbe_ledger, "2001").await, 50_000);
}

#[tokio::test]
async fn unknown_destination_at_the_bank_rolls_back_the_source_leg() {
    // The PSP mirror tracks 2001 at NBE, but the NBE ledger does not have
    // it - the destination prepare fails and the source leg is compensated.
    let (cib_url, cib_ledger) = spawn_bank("CIB", CIB_KEY, &[("1001", 100_000)]).await;
    let (nbe_url, nbe_ledger) = spawn_bank("NBE", NBE_KEY, &[("9999", 1_000)]).await;
    let psp = psp_server(&cib_url, &nbe_url);

    let response = psp
        .post("/v1/transfers")
        .add_header("x-caller-id", "farid")
        .json(&transfer_body(30_000))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["status"], "ROLLED_BACK");

    assert_eq!(balance(&cib_ledger, "1001").await, 100_000);
    assert_eq!(balance(&nbe_ledger, "9999").await, 1_000);
}

#[tokio::test]
async fn unreachable_destination_bank_rolls_back_the_source_leg() {
    let (cib_url, cib_ledger) = spawn_bank("CIB", CIB_KEY, &[("1001", 100_000)]).await;

    // Reserve a port, then free it so connections are refused.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_url = format!("http://{}", dead.local_addr().unwrap());
    drop(dead);

    let psp = psp_server(&cib_url, &dead_url);

    let response = psp
        .post("/v1/transfers")
        .add_header("x-caller-id", "farid")
        .json(&transfer_body(30_000))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "remote_unavailable");
    assert_eq!(body["error"]["details"]["status"], "ROLLED_BACK");

    assert_eq!(balance(&cib_ledger, "1001").await, 100_000);
}

#[tokio::test]
async fn bank_stays_authoritative_when_the_mirror_is_stale() {
    // The mirror believes the source holds 1000.00, but the bank's actual
    // balance has dropped to 100.00: prepare succeeds (no balance check),
    // the source commit aborts, and the destination leg is compensated.
    let (cib_url, cib_ledger) = spawn_bank("CIB", CIB_KEY, &[("1001", 100_000)]).await;
    let (nbe_url, nbe_ledger) = spawn_bank("NBE", NBE_KEY, &[("2001", 50_000)]).await;

    {
        let mut account = cib_ledger
            .lock_account(&AccountNumber::new("1001").unwrap())
            .await
            .unwrap();
        account.withdraw(Amount::from_cents(90_000).unwrap()).unwrap();
    }

    let psp = psp_server(&cib_url, &nbe_url);

    let response = psp
        .post("/v1/transfers")
        .add_header("x-caller-id", "farid")
        .json(&transfer_body(30_000))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["status"], "ROLLED_BACK");

    // Neither ledger moved: the aborted withdrawal never applied, and the
    // deposit (committed or not) was compensated.
    assert_eq!(balance(&cib_ledger, "1001").await, 10_000);
    assert_eq!(balance(&nbe_ledger, "2001").await, 50_000);
}

#[tokio::test]
async fn transfer_requires_caller_identity() {
    let (cib_url, _cib) = spawn_bank("CIB", CIB_KEY, &[("1001", 100_000)]).await;
    let (nbe_url, _nbe) = spawn_bank("NBE", NBE_KEY, &[("2001", 50_000)]).await;
    let psp = psp_server(&cib_url, &nbe_url);

    let response = psp.post("/v1/transfers").json(&transfer_body(30_000)).await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (cib_url, _cib) = spawn_bank("CIB", CIB_KEY, &[("1001", 100_000)]).await;
    let (nbe_url, _nbe) = spawn_bank("NBE", NBE_KEY, &[("2001", 50_000)]).await;
    let psp = psp_server(&cib_url, &nbe_url);

    let response = psp.get("/health").await;
    response.assert_status_ok();
}
