//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The reqwest-based ledger service client
//! - Tokio runtime bridge for async operations

pub mod ledger;
pub mod runtime;

pub use ledger::{LedgerApi, LedgerError, LedgerResult, RemoteLedgerClient};
pub use runtime::{Request, Response, RuntimeBridge, RuntimeCommand, RuntimeEvent};
