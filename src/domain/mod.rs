//! View-model of the ledger screens: collections, selection, submissions

pub mod collection;
pub mod form;
pub mod selection;
pub mod submit;
pub mod timestamp;

pub use collection::{CollectionView, LoadState, RowDescriptor, Template};
pub use form::{FieldKind, FormField, SingleActionForm};
pub use selection::{Keyed, SelectionTracker};
pub use submit::{
    ActionSubmitter, HashVerification, Outcome, Phase, Resolution, ResultFields, ResultSlots,
    PLACEHOLDER,
};
pub use timestamp::{format_timestamp, TimestampStyle};
