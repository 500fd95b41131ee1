//! Submission lifecycle
//!
//! An [`ActionSubmitter`] walks idle -> awaiting -> rendered and owns the
//! result slots a response is written into. Slots are only ever written by a
//! successful response, and only ever reset by [`ActionSubmitter::clear`].

use serde_json::Value;
use tracing::warn;

use crate::infrastructure::ledger::types::scalar_display;
use crate::infrastructure::ledger::{
    CoinbaseReceipt, ItemHash, LedgerError, LedgerResult, MineReceipt, SignedToken,
};

/// Shown in a result slot that holds no value
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Awaiting {
        seq: u64,
    },
    Rendered(Outcome),
}

/// What [`ActionSubmitter::resolve`] did with a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Response to a superseded submission; nothing changed
    Stale,
    /// Slots written
    Rendered,
    /// Slots untouched; the message should be raised as an alert
    Failed(String),
}

/// A response whose fields fill named display slots
pub trait ResultFields {
    fn labels() -> &'static [&'static str];
    /// One value per label; `None` renders as the placeholder
    fn values(&self) -> Vec<Option<String>>;
}

/// Labelled output slots of one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSlots {
    labels: &'static [&'static str],
    values: Vec<String>,
}

impl ResultSlots {
    pub fn new(labels: &'static [&'static str]) -> Self {
        Self {
            labels,
            values: vec![PLACEHOLDER.to_string(); labels.len()],
        }
    }

    pub fn reset(&mut self) {
        for value in &mut self.values {
            *value = PLACEHOLDER.to_string();
        }
    }

    pub fn fill(&mut self, values: Vec<Option<String>>) {
        for (slot, value) in self.values.iter_mut().zip(values) {
            *slot = value.unwrap_or_else(|| PLACEHOLDER.to_string());
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.labels
            .iter()
            .position(|l| *l == label)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.labels
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v == PLACEHOLDER)
    }
}

/// Drives one submit action and keeps its last rendered result
#[derive(Debug, Clone)]
pub struct ActionSubmitter<R> {
    name: &'static str,
    phase: Phase,
    slots: ResultSlots,
    last: Option<R>,
    seq: u64,
}

impl<R: ResultFields> ActionSubmitter<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            phase: Phase::Idle,
            slots: ResultSlots::new(R::labels()),
            last: None,
            seq: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start a submission. Re-triggering while awaiting supersedes the
    /// earlier one.
    pub fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.phase = Phase::Awaiting { seq: self.seq };
        self.seq
    }

    pub fn resolve(&mut self, seq: u64, result: LedgerResult<R>) -> Resolution {
        if self.phase != (Phase::Awaiting { seq }) {
            return Resolution::Stale;
        }
        match result {
            Ok(response) => {
                self.slots.fill(response.values());
                self.last = Some(response);
                self.phase = Phase::Rendered(Outcome::Success);
                Resolution::Rendered
            }
            Err(err) => {
                warn!(action = self.name, error = %err, "submission failed");
                let message = failure_message(&err);
                self.phase = Phase::Rendered(Outcome::Failed(message.clone()));
                Resolution::Failed(message)
            }
        }
    }

    /// Back to idle with every slot showing the placeholder
    pub fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.slots.reset();
        self.last = None;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn slots(&self) -> &ResultSlots {
        &self.slots
    }

    pub fn last(&self) -> Option<&R> {
        self.last.as_ref()
    }
}

/// Text raised to the user for a failed submission
///
/// A logical rejection carries the service's own message; everything else is
/// prefixed so the user can tell a transport problem from a refusal.
pub fn failure_message(err: &LedgerError) -> String {
    match err {
        LedgerError::Rejected(message) => message.clone(),
        other => format!("Error: {other}"),
    }
}

impl ResultFields for CoinbaseReceipt {
    fn labels() -> &'static [&'static str] {
        &["Buyer", "Seller", "Item", "Timestamp", "TxID", "Amount"]
    }

    fn values(&self) -> Vec<Option<String>> {
        vec![
            self.buyer_hash.clone(),
            self.seller_hash.clone(),
            self.item_hash.clone(),
            self.timestamp.as_ref().map(literal),
            self.tx_id.clone(),
            self.amount.as_ref().map(literal),
        ]
    }
}

impl ResultFields for MineReceipt {
    fn labels() -> &'static [&'static str] {
        &["Result"]
    }

    fn values(&self) -> Vec<Option<String>> {
        let summary = self.summary();
        vec![(!summary.is_empty()).then_some(summary)]
    }
}

impl ResultFields for SignedToken {
    fn labels() -> &'static [&'static str] {
        &["Signed token"]
    }

    fn values(&self) -> Vec<Option<String>> {
        vec![Some(self.signed_token.clone())]
    }
}

/// Outcome of comparing a user-supplied hash with the service's
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashVerification {
    pub computed: String,
    pub verified: bool,
}

impl HashVerification {
    pub fn compare(input_hash: &str, computed: ItemHash) -> Self {
        Self {
            verified: input_hash == computed.item_hash,
            computed: computed.item_hash,
        }
    }
}

impl ResultFields for HashVerification {
    fn labels() -> &'static [&'static str] {
        &["Computed hash", "Verified"]
    }

    fn values(&self) -> Vec<Option<String>> {
        vec![Some(self.computed.clone()), Some(self.verified.to_string())]
    }
}

/// A JSON value as literal text; `null` counts as absent
fn literal(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        other => scalar_display(other),
    }
}
