use thiserror::Error;

/// A failure reported by the identity provider.
///
/// `reason` is the provider's own message and is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct AuthError {
    pub reason: String,
}

impl AuthError {
    pub fn new(reason: impl Into<String>) -> Self {
        AuthError {
            reason: reason.into(),
        }
    }
}

/// A read or write against the favorites store failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Error sending request: {0}")]
    Request(String),

    #[error("Unexpected status code {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Error decoding document: {0}")]
    Decode(String),
}

/// A catalog search failed. Never shown to the user; the search degrades to
/// zero results and this is only logged.
#[derive(Error, Debug)]
pub enum SearchFailure {
    #[error("Error sending request: {0}")]
    Transport(String),

    #[error("Unexpected status code: {0}")]
    Status(u16),

    #[error("Error parsing JSON: {0}")]
    Parse(String),
}
