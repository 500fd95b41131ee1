//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI never awaits. It hands [`Request`]s to a worker thread running its
//! own Tokio runtime and later drains the matching [`Response`]s.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tokio::runtime::Runtime;
use tracing::error;

use crate::infrastructure::ledger::{
    Block, CoinbaseReceipt, CoinbaseRequest, ItemHash, LedgerApi, LedgerResult, MineReceipt,
    SignedToken, Transaction, WalletAddress, WalletInfo,
};
use crate::infrastructure::runtime::worker::run_async_worker;

/// One outbound call to the ledger service
///
/// `seq` is chosen by the screen that issued the request and comes back in the
/// response so stale answers can be recognised.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LatestBlocks { seq: u64, count: u32 },
    TransactionPool { seq: u64 },
    ItemHistory { seq: u64, item_hash: String },
    MyWalletAddress { seq: u64 },
    WalletInfo { seq: u64, address: String },
    MineBlock { seq: u64, transactions: Vec<Transaction> },
    CalculateHash { seq: u64, item_id: String },
    SignToken { seq: u64, token: String },
    CreateCoinbase { seq: u64, request: CoinbaseRequest },
}

/// Outcome of a [`Request`], tagged with the same `seq`
#[derive(Debug, Clone)]
pub enum Response {
    LatestBlocks { seq: u64, result: LedgerResult<Vec<Block>> },
    TransactionPool { seq: u64, result: LedgerResult<Vec<Transaction>> },
    ItemHistory { seq: u64, result: LedgerResult<Vec<Transaction>> },
    MyWalletAddress { seq: u64, result: LedgerResult<WalletAddress> },
    WalletInfo { seq: u64, address: String, result: LedgerResult<WalletInfo> },
    MineBlock { seq: u64, result: LedgerResult<MineReceipt> },
    CalculateHash { seq: u64, result: LedgerResult<ItemHash> },
    SignToken { seq: u64, result: LedgerResult<SignedToken> },
    CreateCoinbase { seq: u64, result: LedgerResult<CoinbaseReceipt> },
}

impl Request {
    /// Short label for logs and the status line
    pub fn label(&self) -> &'static str {
        match self {
            Request::LatestBlocks { .. } => "latest blocks",
            Request::TransactionPool { .. } => "transaction pool",
            Request::ItemHistory { .. } => "item history",
            Request::MyWalletAddress { .. } => "wallet address",
            Request::WalletInfo { .. } => "wallet info",
            Request::MineBlock { .. } => "mine block",
            Request::CalculateHash { .. } => "calculate hash",
            Request::SignToken { .. } => "sign token",
            Request::CreateCoinbase { .. } => "coinbase transaction",
        }
    }
}

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Run a request against the ledger service
    Dispatch(Request),
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A dispatched request finished, successfully or not
    Completed(Response),
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread serving requests with the given API
    pub fn new(api: Arc<dyn LedgerApi>) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let runtime = Runtime::new()?;
        thread::Builder::new()
            .name("ledger-worker".into())
            .spawn(move || {
                runtime.block_on(async {
                    if let Err(err) = run_async_worker(api, cmd_rx, evt_tx.clone()).await {
                        error!("worker exited: {err:#}");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Queue a request for the worker
    pub fn dispatch(&self, request: Request) -> anyhow::Result<()> {
        self.send(RuntimeCommand::Dispatch(request))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block until the next event arrives or the worker is gone
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<RuntimeEvent> {
        self.evt_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
