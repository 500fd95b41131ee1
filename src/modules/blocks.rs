//! Latest blocks

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::{Action, Module};
use crate::domain::{CollectionView, TimestampStyle};
use crate::infrastructure::ledger::{Block, LedgerResult};
use crate::infrastructure::runtime::Request;
use crate::modules::rows::block_template;
use crate::modules::{apply_fetch, navigate};

pub struct BlocksScreen {
    view: CollectionView<Block>,
    count: u32,
}

impl BlocksScreen {
    pub fn new(count: u32) -> Self {
        Self {
            view: CollectionView::new("blocks", block_template(TimestampStyle::UnixSeconds)),
            count: count.max(1),
        }
    }

    pub fn view(&self) -> &CollectionView<Block> {
        &self.view
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn set_count(&mut self, count: u32) {
        self.count = count.max(1);
    }

    pub fn fetch(&mut self) -> Request {
        Request::LatestBlocks {
            seq: self.view.begin_fetch(),
            count: self.count,
        }
    }

    pub fn apply(&mut self, seq: u64, result: LedgerResult<Vec<Block>>) -> Action {
        apply_fetch(&mut self.view, seq, result)
    }
}

impl Module for BlocksScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if navigate(&mut self.view, key) {
            return Action::None;
        }
        match key.code {
            KeyCode::Char('r') => Action::Dispatch(self.fetch()),
            _ => Action::None,
        }
    }

    fn refresh(&mut self) -> Vec<Request> {
        vec![self.fetch()]
    }
}
