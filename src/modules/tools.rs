//! Single-action tools: hash verification, token signing, coinbase transaction

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::{Action, Module, NotifyLevel};
use crate::domain::{FormField, HashVerification, SingleActionForm};
use crate::infrastructure::ledger::{
    CoinbaseReceipt, CoinbaseRequest, ItemHash, LedgerError, LedgerResult, SignedToken,
};
use crate::infrastructure::runtime::Request;
use crate::modules::resolution_action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolForm {
    Hash,
    Sign,
    Coinbase,
}

impl ToolForm {
    pub const ALL: [ToolForm; 3] = [ToolForm::Hash, ToolForm::Sign, ToolForm::Coinbase];

    pub fn title(self) -> &'static str {
        match self {
            ToolForm::Hash => "Verify item hash",
            ToolForm::Sign => "Sign token",
            ToolForm::Coinbase => "New coinbase transaction",
        }
    }

    fn next(self) -> Self {
        match self {
            ToolForm::Hash => ToolForm::Sign,
            ToolForm::Sign => ToolForm::Coinbase,
            ToolForm::Coinbase => ToolForm::Hash,
        }
    }

    fn prev(self) -> Self {
        self.next().next()
    }
}

pub struct ToolsScreen {
    pub hash: SingleActionForm<HashVerification>,
    pub sign: SingleActionForm<SignedToken>,
    pub coinbase: SingleActionForm<CoinbaseReceipt>,
    active: ToolForm,
}

impl Default for ToolsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolsScreen {
    pub fn new() -> Self {
        Self {
            hash: SingleActionForm::new(
                "verify hash",
                vec![FormField::text("Item ID"), FormField::text("Item hash")],
            ),
            sign: SingleActionForm::new("sign token", vec![FormField::text("Token")]),
            coinbase: SingleActionForm::new(
                "coinbase transaction",
                vec![FormField::text("Item hash"), FormField::amount("Amount")],
            ),
            active: ToolForm::Hash,
        }
    }

    pub fn active(&self) -> ToolForm {
        self.active
    }

    pub fn activate(&mut self, form: ToolForm) {
        self.active = form;
    }

    pub fn verify_hash(&mut self, item_id: &str, hash: &str) -> Action {
        self.active = ToolForm::Hash;
        self.hash.fill(&[item_id, hash]);
        self.submit()
    }

    pub fn sign_token(&mut self, token: &str) -> Action {
        self.active = ToolForm::Sign;
        self.sign.fill(&[token]);
        self.submit()
    }

    pub fn create_coinbase(&mut self, item_hash: &str, amount: &str) -> Action {
        self.active = ToolForm::Coinbase;
        self.coinbase.fill(&[item_hash, amount]);
        self.submit()
    }

    /// Submit the active form
    pub fn submit(&mut self) -> Action {
        match self.begin_active() {
            Ok(request) => Action::Dispatch(request),
            Err(err) => Action::Notify(err.to_string(), NotifyLevel::Warn),
        }
    }

    fn begin_active(&mut self) -> LedgerResult<Request> {
        match self.active {
            ToolForm::Hash => {
                let (seq, values) = self.hash.begin()?;
                Ok(Request::CalculateHash {
                    seq,
                    item_id: values[0].clone(),
                })
            }
            ToolForm::Sign => {
                let (seq, values) = self.sign.begin()?;
                Ok(Request::SignToken {
                    seq,
                    token: values[0].clone(),
                })
            }
            ToolForm::Coinbase => {
                let (seq, values) = self.coinbase.begin()?;
                // The form has already checked the amount is a whole number
                let amount = values[1].parse::<u64>().map_err(|err| {
                    LedgerError::InvalidInput(format!("Amount {}: {err}", values[1]))
                })?;
                Ok(Request::CreateCoinbase {
                    seq,
                    request: CoinbaseRequest {
                        item_hash: values[0].clone(),
                        amount,
                    },
                })
            }
        }
    }

    /// Reset the active form: blank fields, placeholder results
    pub fn clear(&mut self) {
        match self.active {
            ToolForm::Hash => self.hash.clear(),
            ToolForm::Sign => self.sign.clear(),
            ToolForm::Coinbase => self.coinbase.clear(),
        }
    }

    /// The comparison uses the hash exactly as typed when the form was submitted
    pub fn apply_hash(&mut self, seq: u64, result: LedgerResult<ItemHash>) -> Action {
        let input = self.hash.submitted().get(1).cloned().unwrap_or_default();
        let result = result.map(|computed| HashVerification::compare(&input, computed));
        let resolution = self.hash.resolve(seq, result);
        resolution_action(resolution, || {
            let verified = self.hash.slots().get("Verified").unwrap_or_default();
            Action::Notify(format!("Hash verified: {verified}"), NotifyLevel::Info)
        })
    }

    pub fn apply_sign(&mut self, seq: u64, result: LedgerResult<SignedToken>) -> Action {
        let resolution = self.sign.resolve(seq, result);
        resolution_action(resolution, || {
            Action::Notify("Token signed".into(), NotifyLevel::Info)
        })
    }

    pub fn apply_coinbase(&mut self, seq: u64, result: LedgerResult<CoinbaseReceipt>) -> Action {
        let resolution = self.coinbase.resolve(seq, result);
        resolution_action(resolution, || Action::Alert("Successful transaction".into()))
    }

    fn active_input(&mut self, key: KeyEvent) {
        match (self.active, key.code) {
            (ToolForm::Hash, KeyCode::Char(c)) => self.hash.input_char(c),
            (ToolForm::Sign, KeyCode::Char(c)) => self.sign.input_char(c),
            (ToolForm::Coinbase, KeyCode::Char(c)) => self.coinbase.input_char(c),
            (ToolForm::Hash, KeyCode::Backspace) => self.hash.backspace(),
            (ToolForm::Sign, KeyCode::Backspace) => self.sign.backspace(),
            (ToolForm::Coinbase, KeyCode::Backspace) => self.coinbase.backspace(),
            (ToolForm::Hash, KeyCode::Tab | KeyCode::Down) => self.hash.next_field(),
            (ToolForm::Sign, KeyCode::Tab | KeyCode::Down) => self.sign.next_field(),
            (ToolForm::Coinbase, KeyCode::Tab | KeyCode::Down) => self.coinbase.next_field(),
            (ToolForm::Hash, KeyCode::BackTab | KeyCode::Up) => self.hash.prev_field(),
            (ToolForm::Sign, KeyCode::BackTab | KeyCode::Up) => self.sign.prev_field(),
            (ToolForm::Coinbase, KeyCode::BackTab | KeyCode::Up) => self.coinbase.prev_field(),
            _ => {}
        }
    }
}

impl Module for ToolsScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.active = self.active.next();
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.active = self.active.prev();
                Action::None
            }
            KeyCode::Char('i') | KeyCode::Enter => Action::EditForm,
            KeyCode::Char('c') => {
                self.clear();
                Action::Notify(format!("{} cleared", self.active.title()), NotifyLevel::Info)
            }
            _ => Action::None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::CloseOverlay,
            KeyCode::Enter => self.submit(),
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear();
                Action::None
            }
            _ => {
                self.active_input(key);
                Action::None
            }
        }
    }

    fn refresh(&mut self) -> Vec<Request> {
        Vec::new()
    }
}
