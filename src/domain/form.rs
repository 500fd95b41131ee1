//! Single-action forms
//!
//! A form is a handful of text fields in front of an [`ActionSubmitter`].
//! Submitting snapshots the field values, so edits made while a request is in
//! flight do not change what was sent or what the response is compared with.

use crate::domain::submit::{ActionSubmitter, Phase, Resolution, ResultFields, ResultSlots};
use crate::infrastructure::ledger::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// A non-negative whole number
    Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

impl FormField {
    pub fn text(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Text,
            value: String::new(),
        }
    }

    pub fn amount(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Amount,
            value: String::new(),
        }
    }

    pub fn validate(&self) -> Result<String, LedgerError> {
        let value = self.value.trim();
        if value.is_empty() {
            return Err(LedgerError::InvalidInput(format!("{} is required", self.label)));
        }
        if self.kind == FieldKind::Amount && value.parse::<u64>().is_err() {
            return Err(LedgerError::InvalidInput(format!(
                "{} must be a whole number, got '{value}'",
                self.label
            )));
        }
        Ok(value.to_string())
    }
}

pub struct SingleActionForm<R> {
    fields: Vec<FormField>,
    focus: usize,
    submitter: ActionSubmitter<R>,
    submitted: Vec<String>,
}

impl<R: ResultFields> SingleActionForm<R> {
    pub fn new(name: &'static str, fields: Vec<FormField>) -> Self {
        Self {
            fields,
            focus: 0,
            submitter: ActionSubmitter::new(name),
            submitted: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.submitter.name()
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    /// Overwrite every field, e.g. from a palette command
    pub fn fill(&mut self, values: &[&str]) {
        for (field, value) in self.fields.iter_mut().zip(values) {
            field.value = (*value).to_string();
        }
    }

    /// Validate and snapshot the fields, then start a submission
    ///
    /// Returns the sequence number and the trimmed field values.
    pub fn begin(&mut self) -> LedgerResult<(u64, Vec<String>)> {
        let values = self
            .fields
            .iter()
            .map(FormField::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let seq = self.submitter.begin();
        self.submitted = self.fields.iter().map(|f| f.value.clone()).collect();
        Ok((seq, values))
    }

    /// Field text exactly as typed at the latest [`begin`](Self::begin)
    pub fn submitted(&self) -> &[String] {
        &self.submitted
    }

    pub fn resolve(&mut self, seq: u64, result: LedgerResult<R>) -> Resolution {
        self.submitter.resolve(seq, result)
    }

    /// Blank the fields and reset every result slot
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
        self.focus = 0;
        self.submitted.clear();
        self.submitter.clear();
    }

    pub fn phase(&self) -> &Phase {
        self.submitter.phase()
    }

    pub fn slots(&self) -> &ResultSlots {
        self.submitter.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submit::{HashVerification, PLACEHOLDER};
    use crate::infrastructure::ledger::{CoinbaseReceipt, ItemHash};

    fn hash_form() -> SingleActionForm<HashVerification> {
        SingleActionForm::new(
            "verify hash",
            vec![FormField::text("Item ID"), FormField::text("Hash")],
        )
    }

    #[test]
    fn test_editing_moves_between_fields() {
        let mut form = hash_form();
        for c in "item7".chars() {
            form.input_char(c);
        }
        form.next_field();
        form.input_char('x');
        form.backspace();
        form.input_char('a');
        assert_eq!(form.fields()[0].value, "item7");
        assert_eq!(form.fields()[1].value, "a");
        form.next_field();
        assert_eq!(form.focus(), 0);
        form.prev_field();
        assert_eq!(form.focus(), 1);
    }

    #[test]
    fn test_begin_requires_every_field() {
        let mut form = hash_form();
        form.fill(&["item7"]);
        let err = form.begin().unwrap_err();
        assert_eq!(err, LedgerError::InvalidInput("Hash is required".into()));
        assert_eq!(form.phase(), &Phase::Idle);
    }

    #[test]
    fn test_amount_field_is_validated() {
        let mut form: SingleActionForm<CoinbaseReceipt> = SingleActionForm::new(
            "coinbase",
            vec![FormField::text("Item hash"), FormField::amount("Amount")],
        );
        for bad in ["ten", "1.5", "1e3", "-4"] {
            form.fill(&["abc", bad]);
            assert_eq!(
                form.begin(),
                Err(LedgerError::InvalidInput(format!(
                    "Amount must be a whole number, got '{bad}'"
                )))
            );
        }
        form.fill(&["abc", " 10 "]);
        let (_, values) = form.begin().unwrap();
        assert_eq!(values, vec!["abc".to_string(), "10".to_string()]);
    }

    #[test]
    fn test_submitted_keeps_text_as_typed() {
        let mut form = hash_form();
        form.fill(&[" item7 ", " abc "]);
        let (_, values) = form.begin().unwrap();
        assert_eq!(values, vec!["item7".to_string(), "abc".to_string()]);
        assert_eq!(form.submitted(), [" item7 ".to_string(), " abc ".to_string()]);
    }

    #[test]
    fn test_verification_uses_submitted_snapshot() {
        let mut form = hash_form();
        form.fill(&["item7", "abc"]);
        let (seq, _) = form.begin().unwrap();
        // edits after submitting do not affect the comparison
        form.fill(&["item7", "zzz"]);

        let input = form.submitted()[1].clone();
        let verification = HashVerification::compare(&input, ItemHash { item_hash: "abc".into() });
        assert_eq!(form.resolve(seq, Ok(verification)), Resolution::Rendered);
        assert_eq!(form.slots().get("Verified"), Some("true"));
    }

    #[test]
    fn test_clear_blanks_fields_and_slots() {
        let mut form = hash_form();
        form.fill(&["item7", "abc"]);
        let (seq, _) = form.begin().unwrap();
        form.resolve(
            seq,
            Ok(HashVerification::compare("abc", ItemHash { item_hash: "abd".into() })),
        );
        assert_eq!(form.slots().get("Verified"), Some("false"));

        form.clear();
        assert!(form.fields().iter().all(|f| f.value.is_empty()));
        assert_eq!(form.slots().get("Verified"), Some(PLACEHOLDER));
        assert_eq!(form.phase(), &Phase::Idle);
    }
}
