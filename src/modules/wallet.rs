//! Wallet: own address, mined blocks and coinbase transactions
//!
//! The wallet whose info is shown comes from configuration. With no address
//! configured, the one reported by `/my-wallet/address` is used once it is
//! known.

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

use crate::core::{Action, Module, NotifyLevel};
use crate::domain::{CollectionView, FormField, TimestampStyle};
use crate::infrastructure::ledger::{
    Block, LedgerResult, Transaction, WalletAddress, WalletInfo,
};
use crate::infrastructure::runtime::Request;
use crate::modules::rows::{block_template, transaction_template};
use crate::modules::{apply_fetch, navigate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletPane {
    Mined,
    Coinbase,
}

pub struct WalletScreen {
    own: Option<WalletAddress>,
    own_seq: u64,
    own_error: Option<String>,
    /// Address whose info is requested
    target: Option<String>,
    address_input: FormField,
    mined: CollectionView<Block>,
    coinbase: CollectionView<Transaction>,
    /// Sequence of the coinbase view matching the latest info request
    coinbase_seq: u64,
    info_seq: u64,
    pane: WalletPane,
}

impl WalletScreen {
    pub fn new(address: Option<String>, normalize_timestamps: bool) -> Self {
        let style = if normalize_timestamps {
            TimestampStyle::UnixSeconds
        } else {
            TimestampStyle::AsIs
        };
        Self {
            own: None,
            own_seq: 0,
            own_error: None,
            target: address.filter(|a| !a.trim().is_empty()),
            address_input: FormField::text("Address"),
            mined: CollectionView::new("mined blocks", block_template(style)),
            coinbase: CollectionView::new("coinbase transactions", transaction_template(style)),
            coinbase_seq: 0,
            info_seq: 0,
            pane: WalletPane::Mined,
        }
    }

    pub fn own_address(&self) -> Option<&WalletAddress> {
        self.own.as_ref()
    }

    pub fn own_error(&self) -> Option<&str> {
        self.own_error.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn address_input(&self) -> &FormField {
        &self.address_input
    }

    pub fn mined(&self) -> &CollectionView<Block> {
        &self.mined
    }

    pub fn coinbase(&self) -> &CollectionView<Transaction> {
        &self.coinbase
    }

    pub fn pane(&self) -> WalletPane {
        self.pane
    }

    pub fn fetch_own_address(&mut self) -> Request {
        self.own_seq += 1;
        Request::MyWalletAddress { seq: self.own_seq }
    }

    /// Request info for the current target, if one is known
    pub fn fetch_info(&mut self) -> Option<Request> {
        let address = self.target.clone()?;
        self.info_seq = self.mined.begin_fetch();
        self.coinbase_seq = self.coinbase.begin_fetch();
        Some(Request::WalletInfo {
            seq: self.info_seq,
            address,
        })
    }

    /// Show the wallet at `address` instead of the current target
    pub fn show(&mut self, address: &str) -> Action {
        self.address_input.value = address.to_string();
        self.submit_address()
    }

    fn submit_address(&mut self) -> Action {
        match self.address_input.validate() {
            Ok(address) => {
                self.target = Some(address);
                self.fetch_info().map_or(Action::None, Action::Dispatch)
            }
            Err(err) => Action::Notify(err.to_string(), NotifyLevel::Warn),
        }
    }

    pub fn apply_own_address(&mut self, seq: u64, result: LedgerResult<WalletAddress>) -> Action {
        if seq != self.own_seq {
            return Action::None;
        }
        match result {
            Ok(address) => {
                self.own_error = None;
                let adopt = self.target.is_none() && !address.address.is_empty();
                if adopt {
                    debug!(address = %address.address, "showing own wallet");
                    self.target = Some(address.address.clone());
                }
                self.own = Some(address);
                if adopt {
                    return self.fetch_info().map_or(Action::None, Action::Dispatch);
                }
                Action::None
            }
            Err(err) => {
                let message = format!("Failed to load wallet address: {err}");
                self.own_error = Some(err.to_string());
                Action::Notify(message, NotifyLevel::Warn)
            }
        }
    }

    /// One response fills both tables
    pub fn apply_info(
        &mut self,
        seq: u64,
        address: &str,
        result: LedgerResult<WalletInfo>,
    ) -> Action {
        if seq != self.info_seq {
            return Action::None;
        }
        let (mined, coinbase) = match result {
            Ok(info) => (Ok(info.mined_blocks), Ok(info.coinbase_txs)),
            Err(err) => (Err(err.clone()), Err(err)),
        };
        let action = apply_fetch(&mut self.mined, seq, mined);
        apply_fetch(&mut self.coinbase, self.coinbase_seq, coinbase);
        match action {
            Action::Notify(_, NotifyLevel::Info) => Action::Notify(
                format!(
                    "Wallet {address}: {} mined blocks, {} coinbase transactions",
                    self.mined.len(),
                    self.coinbase.len()
                ),
                NotifyLevel::Info,
            ),
            other => other,
        }
    }

    fn active_view_navigate(&mut self, key: KeyEvent) -> bool {
        match self.pane {
            WalletPane::Mined => navigate(&mut self.mined, key),
            WalletPane::Coinbase => navigate(&mut self.coinbase, key),
        }
    }
}

impl Module for WalletScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.active_view_navigate(key) {
            return Action::None;
        }
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                self.pane = WalletPane::Mined;
                Action::None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.pane = WalletPane::Coinbase;
                Action::None
            }
            KeyCode::Char('i') | KeyCode::Char('/') => Action::EditForm,
            KeyCode::Char('r') => match self.fetch_info() {
                Some(request) => Action::Dispatch(request),
                None => Action::Dispatch(self.fetch_own_address()),
            },
            _ => Action::None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::CloseOverlay,
            KeyCode::Enter => self.submit_address(),
            KeyCode::Backspace => {
                self.address_input.value.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.address_input.value.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn refresh(&mut self) -> Vec<Request> {
        let mut requests = vec![self.fetch_own_address()];
        requests.extend(self.fetch_info());
        requests
    }
}
