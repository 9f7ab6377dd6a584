use thiserror::Error;
use uuid::Uuid;

pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";
pub const SERVER_MESSAGE: &str = "Server error. Please try again later.";
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred.";

/// Why a mutation did not stick. The coordinator has already rolled back by
/// the time a caller sees one of these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistError {
    /// The request never produced a usable response, or the server reported
    /// a transport failure.
    #[error("network error: {0}")]
    Network(String),

    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },

    /// The server understood the request and refused it.
    #[error("request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    /// The mutation named a record the local collection does not hold.
    #[error("{0} is not in the local collection")]
    UnknownEntity(Uuid),

    #[error("position {index} is outside a collection of {len}")]
    OutOfRange { index: usize, len: usize },
}

impl PersistError {
    /// Text suitable for a toast next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            PersistError::Network(_) => NETWORK_MESSAGE.to_string(),
            PersistError::Server { .. } => SERVER_MESSAGE.to_string(),
            PersistError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Whether re-issuing the same mutation might succeed. Nothing retries
    /// automatically; this only informs the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PersistError::Network(_) | PersistError::Server { .. })
    }
}
