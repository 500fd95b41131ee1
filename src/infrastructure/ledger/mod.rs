//! Ledger service access - HTTP client, wire types and the unified error

mod client;
mod error;
pub mod types;

pub use client::{normalize_base_url, ClientConfig, LedgerApi, RemoteLedgerClient};
pub use error::{LedgerError, LedgerResult};
pub use types::{
    Block, CoinbaseReceipt, CoinbaseRequest, ItemHash, MineReceipt, SignedToken, Transaction,
    WalletAddress, WalletInfo,
};
