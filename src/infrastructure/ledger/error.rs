//! Unified failure type for ledger service calls
//!
//! Transport failures (connection, non-2xx status, undecodable body) and
//! logical failures (a 2xx body carrying an `error` field) arrive through the
//! same `Result`, so callers handle both in one place.

use thiserror::Error;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The service answered with a non-success HTTP status
    #[error("HTTP error: {status}{}", status_detail(.detail))]
    Status { status: u16, detail: Option<String> },

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not the JSON we expected
    #[error("decode error: {0}")]
    Decode(String),

    /// The service accepted the request but reported a logical failure
    #[error("{0}")]
    Rejected(String),

    /// Input was refused before any request was made
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl LedgerError {
    /// True for failures that happened before the service could judge the request.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LedgerError::Status { .. } | LedgerError::Transport(_) | LedgerError::Decode(_)
        )
    }
}

fn status_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return LedgerError::Status {
                status: status.as_u16(),
                detail: None,
            };
        }
        if err.is_decode() {
            return LedgerError::Decode(err.to_string());
        }
        LedgerError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Decode(err.to_string())
    }
}
