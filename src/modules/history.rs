//! Transaction history of a single item

use crossterm::event::{KeyCode, KeyEvent};

use crate::core::{Action, Module, NotifyLevel};
use crate::domain::{CollectionView, FormField, TimestampStyle};
use crate::infrastructure::ledger::{LedgerResult, Transaction};
use crate::infrastructure::runtime::Request;
use crate::modules::rows::transaction_template;
use crate::modules::{apply_fetch, navigate};

pub struct HistoryScreen {
    view: CollectionView<Transaction>,
    query: FormField,
    /// Item hash of the rows currently shown
    shown: Option<String>,
}

impl Default for HistoryScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryScreen {
    pub fn new() -> Self {
        Self {
            view: CollectionView::new(
                "history transactions",
                transaction_template(TimestampStyle::UnixSeconds),
            ),
            query: FormField::text("Item hash"),
            shown: None,
        }
    }

    pub fn view(&self) -> &CollectionView<Transaction> {
        &self.view
    }

    pub fn query(&self) -> &FormField {
        &self.query
    }

    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }

    /// Look up the history of `item_hash`
    pub fn lookup(&mut self, item_hash: &str) -> Action {
        self.query.value = item_hash.to_string();
        self.submit()
    }

    fn submit(&mut self) -> Action {
        match self.query.validate() {
            Ok(item_hash) => {
                self.shown = Some(item_hash.clone());
                Action::Dispatch(Request::ItemHistory {
                    seq: self.view.begin_fetch(),
                    item_hash,
                })
            }
            Err(err) => Action::Notify(err.to_string(), NotifyLevel::Warn),
        }
    }

    pub fn apply(&mut self, seq: u64, result: LedgerResult<Vec<Transaction>>) -> Action {
        apply_fetch(&mut self.view, seq, result)
    }
}

impl Module for HistoryScreen {
    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if navigate(&mut self.view, key) {
            return Action::None;
        }
        match key.code {
            KeyCode::Char('i') | KeyCode::Char('/') => Action::EditForm,
            KeyCode::Char('r') => self.refresh().pop().map_or(Action::None, Action::Dispatch),
            KeyCode::Char('c') => {
                self.query.value.clear();
                self.shown = None;
                self.view.clear();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::CloseOverlay,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.query.value.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.query.value.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Re-run the last lookup, if any
    fn refresh(&mut self) -> Vec<Request> {
        let Some(item_hash) = self.shown.clone() else {
            return Vec::new();
        };
        vec![Request::ItemHistory {
            seq: self.view.begin_fetch(),
            item_hash,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typed_lookup_dispatches() {
        let mut screen = HistoryScreen::new();
        assert_eq!(screen.handle_key(key(KeyCode::Char('i'))), Action::EditForm);
        for c in "c0de".chars() {
            screen.handle_form_key(key(KeyCode::Char(c)));
        }
        assert_eq!(
            screen.handle_form_key(key(KeyCode::Enter)),
            Action::Dispatch(Request::ItemHistory {
                seq: 1,
                item_hash: "c0de".into()
            })
        );
        assert_eq!(screen.shown(), Some("c0de"));
    }

    #[test]
    fn test_blank_lookup_is_refused() {
        let mut screen = HistoryScreen::new();
        assert_eq!(
            screen.lookup("  "),
            Action::Notify("invalid input: Item hash is required".into(), NotifyLevel::Warn)
        );
        assert!(screen.refresh().is_empty());
    }

    #[test]
    fn test_refresh_repeats_last_lookup() {
        let mut screen = HistoryScreen::new();
        screen.lookup("abc");
        assert_eq!(
            screen.refresh(),
            vec![Request::ItemHistory {
                seq: 2,
                item_hash: "abc".into()
            }]
        );
    }

    #[test]
    fn test_clear_drops_lookup_in_flight() {
        let mut screen = HistoryScreen::new();
        let Action::Dispatch(Request::ItemHistory { seq, .. }) = screen.lookup("abc") else {
            panic!("lookup did not dispatch");
        };
        assert_eq!(screen.handle_key(key(KeyCode::Char('c'))), Action::None);

        let tx: Transaction = serde_json::from_value(serde_json::json!(
            {"txID": "t1", "itemHash": "abc", "amount": 1, "timestamp": 0}
        ))
        .unwrap();
        assert_eq!(screen.apply(seq, Ok(vec![tx])), Action::None);
        assert!(screen.view().is_empty());
        assert_eq!(screen.shown(), None);
    }
}
