//! App data flow through the runtime bridge, without the TUI
//!
//! A scripted `LedgerApi` stands in for the service; requests travel through
//! the real worker thread and come back as runtime events.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;

use ledgerview::app::{App, AppSettings, StatusLevel, Tab};
use ledgerview::core::parse_command;
use ledgerview::domain::PLACEHOLDER;
use ledgerview::infrastructure::ledger::{
    Block, CoinbaseReceipt, CoinbaseRequest, ItemHash, LedgerApi, LedgerError, LedgerResult,
    MineReceipt, SignedToken, Transaction, WalletAddress, WalletInfo,
};
use ledgerview::infrastructure::runtime::RuntimeBridge;

#[derive(Default)]
struct MockLedger {
    mined: Mutex<Vec<Vec<Transaction>>>,
    coinbase: Mutex<Vec<CoinbaseRequest>>,
}

fn pool() -> Vec<Transaction> {
    serde_json::from_value(json!([
        {"txID": "a", "itemHash": "i1", "amount": 1, "timestamp": 10, "sellerHash": "s1", "buyerHash": "b1"},
        {"txID": "b", "itemHash": "i2", "amount": 2, "timestamp": 20, "sellerHash": "s2", "buyerHash": "b2"},
        {"txID": "c", "itemHash": "i3", "amount": 3, "timestamp": 30, "sellerHash": "s3", "buyerHash": "b3"}
    ]))
    .unwrap()
}

#[async_trait::async_trait]
impl LedgerApi for MockLedger {
    async fn latest_blocks(&self, count: u32) -> LedgerResult<Vec<Block>> {
        Ok((0..count as u64)
            .map(|i| {
                serde_json::from_value(json!({
                    "height": 50 - i,
                    "nonce": i,
                    "block_hash": format!("hash-{}", 50 - i),
                    "difficulty": 3,
                    "timestamp": 1_700_000_000u64
                }))
                .unwrap()
            })
            .collect())
    }

    async fn transaction_pool(&self) -> LedgerResult<Vec<Transaction>> {
        Ok(pool())
    }

    async fn item_history(&self, item_hash: &str) -> LedgerResult<Vec<Transaction>> {
        if item_hash == "missing" {
            return Err(LedgerError::Status {
                status: 404,
                detail: None,
            });
        }
        Ok(pool().into_iter().take(2).collect())
    }

    async fn my_wallet_address(&self) -> LedgerResult<WalletAddress> {
        Ok(WalletAddress {
            address: "own-wallet".into(),
            public_key_hash: "pkh".into(),
            public_key: "pk".into(),
        })
    }

    async fn wallet_info(&self, _address: &str) -> LedgerResult<WalletInfo> {
        Ok(serde_json::from_value(json!({
            "mined_blocks": [{"height": 1, "block_hash": "w1", "timestamp": "2024-01-01"}],
            "coinbase_txs": []
        }))
        .unwrap())
    }

    async fn mine_block(&self, transactions: &[Transaction]) -> LedgerResult<MineReceipt> {
        self.mined.lock().unwrap().push(transactions.to_vec());
        Ok(MineReceipt(json!({"height": 51, "block_hash": "hash-51"})))
    }

    async fn calculate_item_hash(&self, item_id: &str) -> LedgerResult<ItemHash> {
        Ok(ItemHash {
            item_hash: format!("h({item_id})"),
        })
    }

    async fn sign_token(&self, token: &str) -> LedgerResult<SignedToken> {
        Ok(SignedToken {
            signed_token: format!("sig:{token}"),
        })
    }

    async fn create_coinbase(&self, request: &CoinbaseRequest) -> LedgerResult<CoinbaseReceipt> {
        self.coinbase.lock().unwrap().push(request.clone());
        if request.item_hash == "bad" {
            return Err(LedgerError::Rejected("Invalid item".into()));
        }
        Ok(CoinbaseReceipt {
            buyer_hash: Some("buyer".into()),
            seller_hash: None,
            item_hash: Some(request.item_hash.clone()),
            timestamp: Some(json!(1_700_000_000)),
            tx_id: Some("cb-1".into()),
            amount: Some(json!(request.amount)),
        })
    }
}

fn setup() -> (App, RuntimeBridge, Arc<MockLedger>) {
    let ledger = Arc::new(MockLedger::default());
    let bridge = RuntimeBridge::new(ledger.clone()).unwrap();
    let app = App::new(AppSettings {
        service_url: "http://ledger.test".into(),
        wallet_address: None,
        latest_blocks: 5,
        normalize_wallet_timestamps: false,
    });
    (app, bridge, ledger)
}

/// Pump requests and events until nothing is in flight
fn settle(app: &mut App, bridge: &RuntimeBridge) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        for request in app.take_requests() {
            bridge.dispatch(request).unwrap();
        }
        if app.in_flight() == 0 {
            return;
        }
        assert!(Instant::now() < deadline, "requests never completed");
        if let Some(event) = bridge.recv_timeout(Duration::from_millis(100)) {
            app.apply_event(event);
        }
    }
}

fn run(app: &mut App, bridge: &RuntimeBridge, command: &str) {
    let action = app.execute_command(&parse_command(command));
    app.apply_action(action);
    settle(app, bridge);
}

#[test]
fn test_start_loads_every_tab() {
    let (mut app, bridge, _) = setup();
    app.start();
    settle(&mut app, &bridge);

    assert_eq!(app.blocks.view().len(), 5);
    assert_eq!(app.blocks.view().rows()[0].cells[0], "50");
    assert_eq!(app.pool.view().len(), 3);
    assert_eq!(
        app.wallet.own_address().map(|a| a.address.as_str()),
        Some("own-wallet")
    );
    assert_eq!(app.wallet.target(), Some("own-wallet"));
    assert_eq!(app.wallet.mined().len(), 1);
}

#[test]
fn test_mine_sends_selection_in_pool_order() {
    let (mut app, bridge, ledger) = setup();
    app.start();
    settle(&mut app, &bridge);

    app.pool.select("c", true);
    app.pool.select("a", true);
    run(&mut app, &bridge, "mine");

    let mined = ledger.mined.lock().unwrap();
    let ids: Vec<&str> = mined[0].iter().map(|t| t.tx_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    drop(mined);

    assert_eq!(app.active_tab, Tab::Pool);
    let (text, level) = app.status_text().unwrap();
    assert!(text.starts_with("Mined"), "{text}");
    assert_eq!(level, StatusLevel::Info);
    // The pool view is not touched until it is reloaded
    assert_eq!(app.pool.view().len(), 3);
}

#[test]
fn test_history_lookup_and_failure() {
    let (mut app, bridge, _) = setup();
    run(&mut app, &bridge, "history item-1");
    assert_eq!(app.active_tab, Tab::History);
    assert_eq!(app.history.view().len(), 2);

    run(&mut app, &bridge, "history missing");
    assert_eq!(app.history.view().len(), 2);
    let (text, level) = app.status_text().unwrap();
    assert_eq!(level, StatusLevel::Warn);
    assert!(text.contains("HTTP error: 404"), "{text}");
}

#[test]
fn test_coinbase_success_then_rejection() {
    let (mut app, bridge, ledger) = setup();
    run(&mut app, &bridge, "coinbase item-9 1000");
    assert_eq!(app.alert.as_deref(), Some("Successful transaction"));
    assert_eq!(app.tools.coinbase.slots().get("TxID"), Some("cb-1"));
    assert_eq!(app.tools.coinbase.slots().get("Amount"), Some("1000"));
    assert_eq!(app.tools.coinbase.slots().get("Seller"), Some(PLACEHOLDER));
    app.dismiss_alert();

    run(&mut app, &bridge, "coinbase bad 5");
    assert_eq!(app.alert.as_deref(), Some("Invalid item"));
    // Previous receipt stays on screen
    assert_eq!(app.tools.coinbase.slots().get("TxID"), Some("cb-1"));

    let sent = ledger.coinbase.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(serde_json::to_value(&sent[0]).unwrap(), json!({"item_hash": "item-9", "amount": 1000}));
}

#[test]
fn test_coinbase_with_bad_amount_sends_nothing() {
    let (mut app, bridge, ledger) = setup();
    run(&mut app, &bridge, "coinbase item-9 lots");
    assert!(ledger.coinbase.lock().unwrap().is_empty());
    let (text, level) = app.status_text().unwrap();
    assert_eq!(level, StatusLevel::Warn);
    assert!(text.contains("Amount must be a whole number"), "{text}");
}

#[test]
fn test_hash_verification_and_sign() {
    let (mut app, bridge, _) = setup();
    run(&mut app, &bridge, "hash item-1 h(item-1)");
    assert_eq!(app.tools.hash.slots().get("Verified"), Some("true"));

    run(&mut app, &bridge, "hash item-1 other");
    assert_eq!(app.tools.hash.slots().get("Verified"), Some("false"));
    assert_eq!(app.tools.hash.slots().get("Computed hash"), Some("h(item-1)"));

    run(&mut app, &bridge, "sign tok");
    assert_eq!(app.tools.sign.slots().get("Signed token"), Some("sig:tok"));

    run(&mut app, &bridge, "clear");
    assert!(app.tools.sign.slots().is_blank());
}
