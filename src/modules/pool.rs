//! Transaction pool: select transactions and mine them into a block
//!
//! The mine payload is always the current selection, in pool order. Nothing
//! is removed from the pool locally after mining; the next fetch shows what
//! the service did.

use crossterm::event::{KeyCode, KeyEvent};
use tracing::info;

use crate::core::{Action, Module, NotifyLevel};
use crate::domain::{ActionSubmitter, CollectionView, Keyed, SelectionTracker, TimestampStyle};
use crate::infrastructure::ledger::{LedgerResult, MineReceipt, Transaction};
use crate::infrastructure::runtime::Request;
use crate::modules::rows::transaction_template;
use crate::modules::{apply_fetch, navigate, resolution_action};

pub struct PoolScreen {
    view: CollectionView<Transaction>,
    selection: SelectionTracker<Transaction>,
    mine: ActionSubmitter<MineReceipt>,
}

impl Default for PoolScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolScreen {
    pub fn new() -> Self {
        Self {
            view: CollectionView::new(
                "pool transactions",
                transaction_template(TimestampStyle::UnixSeconds),
            ),
            selection: SelectionTracker::default(),
            mine: ActionSubmitter::new("mine block"),
        }
    }

    pub fn view(&self) -> &CollectionView<Transaction> {
        &self.view
    }

    pub fn selection(&self) -> &SelectionTracker<Transaction> {
        &self.selection
    }

    pub fn mine_submitter(&self) -> &ActionSubmitter<MineReceipt> {
        &self.mine
    }

    pub fn is_selected(&self, tx: &Transaction) -> bool {
        self.selection.is_selected(&tx.key())
    }

    pub fn fetch(&mut self) -> Request {
        Request::TransactionPool {
            seq: self.view.begin_fetch(),
        }
    }

    /// A successful fetch replaces the snapshot and discards the selection
    pub fn apply_pool(&mut self, seq: u64, result: LedgerResult<Vec<Transaction>>) -> Action {
        let fresh = result.is_ok();
        let action = apply_fetch(&mut self.view, seq, result);
        if fresh && action != Action::None {
            self.selection.replace(self.view.items().to_vec());
        }
        action
    }

    /// Toggle selection of the transaction under the cursor
    pub fn toggle_current(&mut self) -> bool {
        let Some(key) = self.view.current().map(Keyed::key) else {
            return false;
        };
        self.selection.toggle(&key)
    }

    pub fn select(&mut self, tx_id: &str, selected: bool) -> bool {
        self.selection.set(tx_id, selected)
    }

    /// Submit the selected transactions for mining
    pub fn mine(&mut self) -> Request {
        let transactions = self.selection.current_selection();
        info!(count = transactions.len(), "mining selected transactions");
        Request::MineBlock {
            seq: self.mine.begin(),
            transactions,
        }
    }

    pub fn apply_mine(&mut self, seq: u64, result: LedgerResult<MineReceipt>) -> Action {
        let resolution = self.mine.resolve(seq, result);
        resolution_action(resolution, || {
            let summary = self.mine.last().map(MineReceipt::summary).unwrap_or_default();
            Action::Notify(
                format!("Mined {summary}; press r to reload the pool"),
                NotifyLevel::Info,
            )
        })
    }
}

impl Module for PoolScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if navigate(&mut self.view, key) {
            return Action::None;
        }
        match key.code {
            KeyCode::Char(' ') => {
                self.toggle_current();
                Action::None
            }
            KeyCode::Char('m') => Action::Dispatch(self.mine()),
            KeyCode::Char('r') => Action::Dispatch(self.fetch()),
            _ => Action::None,
        }
    }

    fn refresh(&mut self) -> Vec<Request> {
        vec![self.fetch()]
    }
}
