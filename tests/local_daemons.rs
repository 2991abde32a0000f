//! Daemon adapters against an in-process fake signing daemon

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use kda_wallet::pact::{Capability, PublicMeta, Signer};
use kda_wallet::wallets::{ChainweaverConnector, ZelcoreConnector};
use kda_wallet::{Account, Error, KdaWallet, PactCommand, WalletConnector};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const SENDER: &str = "5a2afbc4564b76b2c27ce5a644cab643c43663835ea0be22433b209d3351f937";
const RECEIVER: &str = "e4c6807d79d8bf4695e10e5678ebf72862f59b71f971d39dd3349f4beeacd6e3";

#[derive(Clone, Default)]
struct Daemon {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    reply: Arc<Mutex<Option<(StatusCode, Value)>>>,
}

impl Daemon {
    fn reply_with(&self, status: StatusCode, body: Value) {
        *self.reply.lock().unwrap() = Some((status, body));
    }

    fn last_request(&self) -> (String, Value) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    fn answer(&self, endpoint: &str, body: Value) -> (StatusCode, Json<Value>) {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), body));
        let (status, reply) = self
            .reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or((StatusCode::OK, json!({})));
        (status, Json(reply))
    }
}

async fn sign(
    State(daemon): State<Daemon>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    daemon.answer("sign", body)
}

async fn quicksign(
    State(daemon): State<Daemon>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    daemon.answer("quicksign", body)
}

async fn accounts(
    State(daemon): State<Daemon>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    daemon.answer("accounts", body)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Chainweaver's sign route is POST-only, so GET gets 405
fn chainweaver_routes(daemon: Daemon) -> Router {
    Router::new()
        .route("/v1/sign", post(sign))
        .route("/v1/quicksign", post(quicksign))
        .with_state(daemon)
}

/// Zelcore answers GET on its sign route with 404
fn zelcore_routes(daemon: Daemon) -> Router {
    Router::new()
        .route("/v1/sign", post(sign).fallback(not_found))
        .route("/v1/accounts", post(accounts))
        .with_state(daemon)
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn transfer_cmd() -> PactCommand {
    let mut data = serde_json::Map::new();
    data.insert("note".to_string(), json!("integration"));
    PactCommand {
        code: format!("(coin.transfer \"k:{SENDER}\" \"k:{RECEIVER}\" 1.0)"),
        data,
        signers: vec![Signer::new(
            SENDER,
            vec![
                Capability::new("coin.GAS", vec![]),
                Capability::new(
                    "coin.TRANSFER",
                    vec![
                        json!(format!("k:{SENDER}")),
                        json!(format!("k:{RECEIVER}")),
                        json!(1.0),
                    ],
                ),
            ],
        )],
        network_id: "testnet04".to_string(),
        public_meta: PublicMeta {
            chain_id: "1".to_string(),
            sender: format!("k:{SENDER}"),
            gas_limit: 2500,
            gas_price: 1e-8,
            ttl: 600,
        },
        nonce: Some("integration-nonce".to_string()),
        creation_time: Some(1_700_000_000),
    }
}

fn signed_reply(hash: &str) -> Value {
    json!({ "cmd": "{}", "hash": hash, "sigs": [{ "sig": "deadbeef" }] })
}

#[tokio::test]
async fn chainweaver_probe_expects_method_not_allowed() {
    let url = serve(chainweaver_routes(Daemon::default())).await;
    assert!(ChainweaverConnector::with_url(&url).unwrap().is_installed().await);
    // Same daemon, wrong product
    assert!(!ZelcoreConnector::with_url(&url).unwrap().is_installed().await);
}

#[tokio::test]
async fn probe_of_closed_port_is_false() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/v1", listener.local_addr().unwrap());
    drop(listener);
    assert!(!ChainweaverConnector::with_url(&url).unwrap().is_installed().await);
}

#[tokio::test]
async fn unreachable_daemon_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/v1", listener.local_addr().unwrap());
    drop(listener);

    let wallet = ChainweaverConnector::with_url(&url)
        .unwrap()
        .connect(vec![Account::k_account_for(SENDER)])
        .await
        .unwrap();
    let err = wallet.sign_cmd(&transfer_cmd()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "unexpected error: {err:?}");

    match ZelcoreConnector::with_url(&url).unwrap().connect(()).await {
        Err(Error::Transport(_)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn chainweaver_signs_with_v2_request() {
    let daemon = Daemon::default();
    daemon.reply_with(StatusCode::OK, signed_reply("h1"));
    let url = serve(chainweaver_routes(daemon.clone())).await;

    let wallet = ChainweaverConnector::with_url(&url)
        .unwrap()
        .connect(vec![Account::k_account_for(SENDER)])
        .await
        .unwrap();
    let signed = wallet.sign_cmd(&transfer_cmd()).await.unwrap();
    assert_eq!(signed.hash, "h1");
    assert_eq!(signed.sigs[0].sig.as_deref(), Some("deadbeef"));

    let (endpoint, request) = daemon.last_request();
    assert_eq!(endpoint, "sign");
    assert_eq!(request["code"], json!(transfer_cmd().code));
    assert_eq!(request["sender"], json!(format!("k:{SENDER}")));
    assert_eq!(request["chainId"], json!("1"));
    assert_eq!(request["caps"].as_array().unwrap().len(), 2);
    assert_eq!(request["extraSigners"], json!([]));
    assert!(request.get("signingPubKey").is_none());
}

#[tokio::test]
async fn chainweaver_reports_daemon_errors_as_signing() {
    let daemon = Daemon::default();
    daemon.reply_with(StatusCode::BAD_REQUEST, json!("user declined"));
    let url = serve(chainweaver_routes(daemon)).await;

    let wallet = ChainweaverConnector::with_url(&url)
        .unwrap()
        .connect(vec![Account::k_account_for(SENDER)])
        .await
        .unwrap();
    match wallet.sign_cmd(&transfer_cmd()).await {
        Err(Error::Signing(msg)) => assert!(msg.contains("user declined")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn chainweaver_quicksign_attaches_signatures() {
    let daemon = Daemon::default();
    daemon.reply_with(
        StatusCode::OK,
        json!({
            "responses": [{
                "commandSigData": {
                    "cmd": "ignored",
                    "sigs": [{ "pubKey": SENDER, "sig": "cafe" }]
                },
                "outcome": { "result": "success", "hash": "ignored" }
            }]
        }),
    );
    let url = serve(chainweaver_routes(daemon.clone())).await;

    let wallet = ChainweaverConnector::with_url(&url)
        .unwrap()
        .connect(vec![Account::k_account_for(SENDER)])
        .await
        .unwrap();
    let signed = wallet.quick_sign_cmds(&[transfer_cmd()]).await.unwrap();
    assert_eq!(signed.len(), 1);
    assert_eq!(signed[0].sigs[0].sig.as_deref(), Some("cafe"));

    let (endpoint, request) = daemon.last_request();
    assert_eq!(endpoint, "quicksign");
    let sent = &request["cmdSigDatas"][0];
    // The sent command string is what comes back, hashed locally
    assert_eq!(sent["cmd"].as_str().unwrap(), signed[0].cmd);
    assert_eq!(sent["sigs"], json!([{ "pubKey": SENDER, "sig": null }]));
}

#[tokio::test]
async fn chainweaver_quicksign_failure_outcome_fails_batch() {
    let daemon = Daemon::default();
    daemon.reply_with(
        StatusCode::OK,
        json!({
            "responses": [{
                "commandSigData": { "cmd": "c", "sigs": [] },
                "outcome": { "result": "failure", "msg": "Rejected by user" }
            }]
        }),
    );
    let url = serve(chainweaver_routes(daemon)).await;

    let wallet = ChainweaverConnector::with_url(&url)
        .unwrap()
        .connect(vec![Account::k_account_for(SENDER)])
        .await
        .unwrap();
    match wallet.quick_sign_cmds(&[transfer_cmd()]).await {
        Err(Error::Signing(msg)) => assert_eq!(msg, "Rejected by user"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn zelcore_probe_expects_not_found() {
    let url = serve(zelcore_routes(Daemon::default())).await;
    assert!(ZelcoreConnector::with_url(&url).unwrap().is_installed().await);
    assert!(!ChainweaverConnector::with_url(&url).unwrap().is_installed().await);
}

#[tokio::test]
async fn zelcore_connect_pairs_flat_account_listing() {
    let daemon = Daemon::default();
    daemon.reply_with(
        StatusCode::OK,
        json!({ "status": "success", "data": [format!("k:{SENDER}"), SENDER, "alice", RECEIVER] }),
    );
    let url = serve(zelcore_routes(daemon.clone())).await;

    let wallet = ZelcoreConnector::with_url(&url)
        .unwrap()
        .connect(())
        .await
        .unwrap();
    assert_eq!(
        wallet.accounts(),
        &[
            Account::new(format!("k:{SENDER}"), SENDER),
            Account::new("alice", RECEIVER),
        ]
    );
    assert_eq!(daemon.last_request(), ("accounts".to_string(), json!({ "asset": "kadena" })));
}

#[tokio::test]
async fn zelcore_accounts_error_status_is_connection_error() {
    let daemon = Daemon::default();
    daemon.reply_with(StatusCode::OK, json!({ "status": "error", "data": "locked" }));
    let url = serve(zelcore_routes(daemon)).await;

    match ZelcoreConnector::with_url(&url).unwrap().connect(()).await {
        Err(Error::Connection(msg)) => assert_eq!(msg, "locked"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn zelcore_signs_with_v1_request() {
    let daemon = Daemon::default();
    daemon.reply_with(
        StatusCode::OK,
        json!({ "status": "success", "data": [format!("k:{SENDER}"), SENDER] }),
    );
    let url = serve(zelcore_routes(daemon.clone())).await;
    let wallet = ZelcoreConnector::with_url(&url)
        .unwrap()
        .connect(())
        .await
        .unwrap();

    daemon.reply_with(StatusCode::OK, json!({ "body": signed_reply("z1") }));
    let signed = wallet.sign_cmd(&transfer_cmd()).await.unwrap();
    assert_eq!(signed.hash, "z1");

    let (endpoint, request) = daemon.last_request();
    assert_eq!(endpoint, "sign");
    assert_eq!(request["signingPubKey"], json!(SENDER));
    assert_eq!(request["code"], json!(transfer_cmd().code));
    assert!(request.get("networkId").is_none());

    assert!(wallet.quick_sign_cmds(&[transfer_cmd()]).await.unwrap_err().is_unimplemented());
}
