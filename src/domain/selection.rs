//! Selection over a fetched snapshot
//!
//! Items are addressed by a stable key (the transaction id), never by their
//! position, so a selection cannot silently point at a different item.

use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use crate::infrastructure::ledger::Transaction;

/// Stable identity of an item across fetches
pub trait Keyed {
    fn key(&self) -> String;
}

impl Keyed for Transaction {
    fn key(&self) -> String {
        self.tx_id.clone()
    }
}

/// Selected subset of one snapshot
#[derive(Debug, Clone)]
pub struct SelectionTracker<T> {
    snapshot: Vec<T>,
    keys: HashSet<String>,
    selected: HashSet<String>,
}

impl<T> Default for SelectionTracker<T> {
    fn default() -> Self {
        Self {
            snapshot: Vec::new(),
            keys: HashSet::new(),
            selected: HashSet::new(),
        }
    }
}

impl<T: Keyed + Clone> SelectionTracker<T> {
    pub fn new(snapshot: Vec<T>) -> Self {
        let mut tracker = Self::default();
        tracker.replace(snapshot);
        tracker
    }

    /// Swap in a freshly fetched snapshot; the previous selection is discarded.
    ///
    /// Items sharing a key are selected and deselected together.
    pub fn replace(&mut self, snapshot: Vec<T>) {
        self.keys.clear();
        let mut dups = BTreeSet::new();
        for key in snapshot.iter().map(Keyed::key) {
            if !self.keys.insert(key.clone()) {
                dups.insert(key);
            }
        }
        if !dups.is_empty() {
            warn!(keys = ?dups, "snapshot items share a key; they are selected together");
        }
        self.snapshot = snapshot;
        self.selected.clear();
    }

    /// Flip the selection of `key`. Unknown keys are ignored and return false.
    pub fn toggle(&mut self, key: &str) -> bool {
        if !self.keys.contains(key) {
            return false;
        }
        if !self.selected.remove(key) {
            self.selected.insert(key.to_string());
        }
        true
    }

    pub fn set(&mut self, key: &str, selected: bool) -> bool {
        if !self.keys.contains(key) {
            return false;
        }
        if selected {
            self.selected.insert(key.to_string());
        } else {
            self.selected.remove(key);
        }
        true
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.selected.contains(key)
    }

    /// Selected items, in snapshot order whatever order they were toggled in
    pub fn current_selection(&self) -> Vec<T> {
        self.snapshot
            .iter()
            .filter(|item| self.selected.contains(&item.key()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
