//! UI Modules
//!
//! Each module implements the Module trait and owns its render targets:
//! - blocks: latest mined blocks
//! - pool: transaction pool with selection and block mining
//! - history: transactions of one item
//! - wallet: wallet address, mined blocks and coinbase transactions
//! - tools: hash verification, token signing, coinbase transaction

pub mod blocks;
pub mod history;
pub mod pool;
pub mod rows;
pub mod tools;
pub mod wallet;

pub use blocks::BlocksScreen;
pub use history::HistoryScreen;
pub use pool::PoolScreen;
pub use tools::{ToolForm, ToolsScreen};
pub use wallet::{WalletPane, WalletScreen};

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::{Action, NotifyLevel};
use crate::domain::{CollectionView, LoadState, Resolution};
use crate::infrastructure::ledger::LedgerResult;

/// Cursor and detail-row keys shared by every table
///
/// Returns true when the key was consumed.
pub(crate) fn navigate<T>(view: &mut CollectionView<T>, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => view.move_down(),
        KeyCode::Char('k') | KeyCode::Up => view.move_up(),
        KeyCode::Char('g') | KeyCode::Home => view.go_to_top(),
        KeyCode::Char('G') | KeyCode::End => view.go_to_bottom(),
        KeyCode::Enter | KeyCode::Char('e') => {
            view.toggle_current();
        }
        _ => return false,
    }
    true
}

/// Apply a fetch result to a view and describe it for the status line
pub(crate) fn apply_fetch<T>(
    view: &mut CollectionView<T>,
    seq: u64,
    result: LedgerResult<Vec<T>>,
) -> Action {
    if !view.apply(seq, result) {
        return Action::None;
    }
    match view.load_state() {
        LoadState::Failed(message) => Action::Notify(
            format!("Failed to load {}: {message}", view.title()),
            NotifyLevel::Warn,
        ),
        _ => Action::Notify(
            format!("Loaded {} {}", view.len(), view.title()),
            NotifyLevel::Info,
        ),
    }
}

/// Turn a submission outcome into what the user sees
pub(crate) fn resolution_action(resolution: Resolution, success: impl FnOnce() -> Action) -> Action {
    match resolution {
        Resolution::Stale => Action::None,
        Resolution::Rendered => success(),
        Resolution::Failed(message) => Action::Alert(message),
    }
}
