//! Ledger client against an in-process stand-in service
//!
//! Each test binds an axum router on 127.0.0.1:0 and points a
//! `RemoteLedgerClient` at it.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use ledgerview::infrastructure::ledger::{
    ClientConfig, CoinbaseRequest, LedgerApi, LedgerError, RemoteLedgerClient, Transaction,
};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    paths: Arc<Mutex<Vec<String>>>,
}

async fn serve(router: Router) -> RemoteLedgerClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    RemoteLedgerClient::new(ClientConfig::new(format!("http://{addr}"))).expect("client")
}

fn ledger(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/block/last/:n",
            get(|Path(n): Path<u32>| async move {
                let blocks: Vec<Value> = (0..n)
                    .map(|i| {
                        json!({
                            "height": 100 - i,
                            "nonce": 7,
                            "block_hash": format!("00ab{i}"),
                            "difficulty": 4,
                            "timestamp": 1_700_000_000 + i
                        })
                    })
                    .collect();
                Json(Value::Array(blocks))
            }),
        )
        .route("/transaction/pool", get(|| async { Json(Value::Null) }))
        .route(
            "/item/history/:hash",
            get(
                |State(rec): State<Recorded>, Path(hash): Path<String>| async move {
                    rec.paths.lock().unwrap().push(hash.clone());
                    Json(json!([{"txID": "t1", "itemHash": hash, "amount": 3, "timestamp": 0}]))
                },
            ),
        )
        .route(
            "/my-wallet/address",
            get(|| async {
                Json(json!({"address": "DuWso", "public_key_hash": "pkh", "public_key": "pk"}))
            }),
        )
        .route(
            "/wallet/info/:address",
            get(|| async {
                Json(json!({
                    "mined_blocks": [{"height": 1, "block_hash": "0a"}],
                    "coinbase_txs": null
                }))
            }),
        )
        .route(
            "/block/mine",
            post(
                |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                    rec.bodies.lock().unwrap().push(body.clone());
                    Json(json!({"height": 101, "block_hash": "00ff"}))
                },
            ),
        )
        .route(
            "/transaction/coinbase",
            post(
                |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
                    rec.bodies.lock().unwrap().push(body.clone());
                    if body["item_hash"] == "unknown" {
                        return Json(json!({"error": "item not found"}));
                    }
                    Json(json!({
                        "buyerHash": "buyer",
                        "sellerHash": null,
                        "itemHash": body["item_hash"],
                        "timestamp": 1_700_000_000,
                        "txID": "cb-1",
                        "amount": body["amount"]
                    }))
                },
            ),
        )
        .route(
            "/item/calculate-hash/:id",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "hash service down"})),
                )
            }),
        )
        .route(
            "/token/sign/:token",
            get(|Path(token): Path<String>| async move {
                Json(json!({"signed_token": format!("signed:{token}")}))
            }),
        )
        .with_state(recorded)
}

/// Routes answering with plain text instead of JSON
fn plain_text() -> Router {
    Router::new()
        .route(
            "/plain/ok",
            get(|| async { "not json" }).post(|| async { "not json" }),
        )
        .route(
            "/plain/fail",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") })
                .post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        )
}

#[tokio::test]
async fn test_latest_blocks_in_server_order() {
    let client = serve(ledger(Recorded::default())).await;
    let blocks = client.latest_blocks(3).await.unwrap();
    let heights: Vec<u64> = blocks.iter().map(|b| b.height).collect();
    assert_eq!(heights, vec![100, 99, 98]);
    assert_eq!(blocks[0].block_hash, "00ab0");
}

#[tokio::test]
async fn test_null_pool_is_empty() {
    let client = serve(ledger(Recorded::default())).await;
    assert!(client.transaction_pool().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_history_segment_is_percent_encoded() {
    let recorded = Recorded::default();
    let client = serve(ledger(recorded.clone())).await;
    let history = client.item_history("a/b c").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].item_hash, "a/b c");
    assert_eq!(recorded.paths.lock().unwrap().as_slice(), ["a/b c".to_string()]);
}

#[tokio::test]
async fn test_blank_history_hash_makes_no_request() {
    let recorded = Recorded::default();
    let client = serve(ledger(recorded.clone())).await;
    let err = client.item_history("  ").await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
    assert!(recorded.paths.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_wallet_address_and_info() {
    let client = serve(ledger(Recorded::default())).await;
    let own = client.my_wallet_address().await.unwrap();
    assert_eq!(own.address, "DuWso");
    let info = client.wallet_info(&own.address).await.unwrap();
    assert_eq!(info.mined_blocks.len(), 1);
    assert!(info.coinbase_txs.is_empty());
}

#[tokio::test]
async fn test_mine_posts_selected_transactions() {
    let recorded = Recorded::default();
    let client = serve(ledger(recorded.clone())).await;
    let selected: Vec<Transaction> = serde_json::from_value(json!([
        {"txID": "a", "itemHash": "i1", "amount": 1, "timestamp": 1, "signature": "sig-a"},
        {"txID": "c", "itemHash": "i3", "amount": 3, "timestamp": 3}
    ]))
    .unwrap();

    let receipt = client.mine_block(&selected).await.unwrap();
    assert_eq!(receipt.0["height"], 101);

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0][0]["txID"], "a");
    assert_eq!(bodies[0][0]["signature"], "sig-a");
    assert_eq!(bodies[0][1]["txID"], "c");
}

#[tokio::test]
async fn test_coinbase_success() {
    let recorded = Recorded::default();
    let client = serve(ledger(recorded.clone())).await;
    let request = CoinbaseRequest {
        item_hash: "item-9".into(),
        amount: 1000,
    };
    let receipt = client.create_coinbase(&request).await.unwrap();
    assert_eq!(receipt.tx_id.as_deref(), Some("cb-1"));
    assert_eq!(receipt.seller_hash, None);
    assert_eq!(receipt.amount, Some(json!(1000)));
    assert_eq!(
        recorded.bodies.lock().unwrap()[0],
        json!({"item_hash": "item-9", "amount": 1000})
    );
}

#[tokio::test]
async fn test_coinbase_error_field_is_rejected() {
    let client = serve(ledger(Recorded::default())).await;
    let request = CoinbaseRequest {
        item_hash: "unknown".into(),
        amount: 5,
    };
    let err = client.create_coinbase(&request).await.unwrap_err();
    assert_eq!(err, LedgerError::Rejected("item not found".into()));
    assert_eq!(err.to_string(), "item not found");
}

#[tokio::test]
async fn test_server_error_status() {
    let client = serve(ledger(Recorded::default())).await;
    let err = client.calculate_item_hash("item-1").await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::Status {
            status: 500,
            detail: Some("hash service down".into())
        }
    );
}

#[tokio::test]
async fn test_sign_token() {
    let client = serve(ledger(Recorded::default())).await;
    let signed = client.sign_token("abc").await.unwrap();
    assert_eq!(signed.signed_token, "signed:abc");
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = RemoteLedgerClient::new(ClientConfig::new(format!("http://{addr}"))).unwrap();
    let err = client.transaction_pool().await.unwrap_err();
    assert!(err.is_transport(), "{err:?}");
}

#[tokio::test]
async fn test_fetch_plain_text_body() {
    let client = serve(plain_text()).await;

    let err = client
        .fetch_collection::<Value>(&["plain", "ok"])
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Decode(_)), "{err:?}");

    let err = client
        .fetch_collection::<Value>(&["plain", "fail"])
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::Status {
            status: 500,
            detail: None
        }
    );
}

#[tokio::test]
async fn test_submit_plain_text_body() {
    let client = serve(plain_text()).await;

    let err = client
        .submit::<_, Value>(&["plain", "ok"], &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Decode(_)), "{err:?}");

    let err = client
        .submit::<_, Value>(&["plain", "fail"], &json!({}))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::Status {
            status: 500,
            detail: None
        }
    );
}
