//! Async worker - runs in Tokio runtime and serves ledger requests

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::infrastructure::ledger::LedgerApi;
use crate::infrastructure::runtime::bridge::{Request, Response, RuntimeCommand, RuntimeEvent};

/// Run the async worker loop
///
/// Every dispatched request runs as its own task, so a slow endpoint never
/// holds back the others and completions arrive in no particular order.
pub async fn run_async_worker(
    api: Arc<dyn LedgerApi>,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut poll_interval = interval(Duration::from_millis(25));

    loop {
        loop {
            match cmd_rx.try_recv() {
                Ok(RuntimeCommand::Shutdown) => {
                    info!("worker shutting down");
                    return Ok(());
                }
                Ok(RuntimeCommand::Dispatch(request)) => {
                    debug!(request = request.label(), "dispatch");
                    let api = Arc::clone(&api);
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let response = execute(api.as_ref(), request).await;
                        if evt_tx.send(RuntimeEvent::Completed(response)).is_err() {
                            warn!("response dropped: event channel closed");
                        }
                    });
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        poll_interval.tick().await;
    }
}

/// Perform one request against the API
pub async fn execute(api: &dyn LedgerApi, request: Request) -> Response {
    match request {
        Request::LatestBlocks { seq, count } => Response::LatestBlocks {
            seq,
            result: api.latest_blocks(count).await,
        },
        Request::TransactionPool { seq } => Response::TransactionPool {
            seq,
            result: api.transaction_pool().await,
        },
        Request::ItemHistory { seq, item_hash } => Response::ItemHistory {
            seq,
            result: api.item_history(&item_hash).await,
        },
        Request::MyWalletAddress { seq } => Response::MyWalletAddress {
            seq,
            result: api.my_wallet_address().await,
        },
        Request::WalletInfo { seq, address } => {
            let result = api.wallet_info(&address).await;
            Response::WalletInfo {
                seq,
                address,
                result,
            }
        }
        Request::MineBlock { seq, transactions } => Response::MineBlock {
            seq,
            result: api.mine_block(&transactions).await,
        },
        Request::CalculateHash { seq, item_id } => Response::CalculateHash {
            seq,
            result: api.calculate_item_hash(&item_id).await,
        },
        Request::SignToken { seq, token } => Response::SignToken {
            seq,
            result: api.sign_token(&token).await,
        },
        Request::CreateCoinbase { seq, request } => Response::CreateCoinbase {
            seq,
            result: api.create_coinbase(&request).await,
        },
    }
}
