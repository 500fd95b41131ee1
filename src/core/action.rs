//! Actions that modules can return to communicate with the app

use crate::infrastructure::runtime::Request;

/// Actions returned by modules to communicate state changes
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action needed
    None,

    /// Send a request to the ledger service
    Dispatch(Request),

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Raise a modal alert that must be dismissed
    Alert(String),

    /// Enter form editing on the current screen
    EditForm,

    /// Leave form editing
    CloseOverlay,

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
}
