//! Error types for cloud API operations.

use thiserror::Error;

/// Errors from cloud API operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller passed an unusable argument (blank name or id).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A lookup yielded zero candidates.
    ///
    /// Callers that treat "no instance yet" as an expected condition can
    /// branch on [`Error::is_not_found`].
    #[error("no {resource} found for {query:?}")]
    NotFound {
        resource: &'static str,
        query: String,
    },

    /// A lookup yielded more than one candidate. This indicates a naming
    /// problem in the compartment and is never retried.
    #[error("expected one {resource} for {query:?} but found {count}")]
    Ambiguous {
        resource: &'static str,
        query: String,
        count: usize,
    },

    /// The backend returned data this client cannot interpret.
    #[error("malformed data from backend: {0}")]
    MalformedData(String),

    /// A work request reached the terminal failed state.
    #[error("work request {id} failed: {message}")]
    OperationFailed { id: String, message: String },

    /// A work request did not reach a terminal state within the poll budget.
    #[error("work request {id} not terminal after {attempts} polls")]
    Timeout { id: String, attempts: u32 },

    /// A list endpoint returned the same page cursor twice in a row.
    /// Looping on it would never terminate, so it is surfaced instead.
    #[error("list endpoint repeated page cursor {cursor:?}")]
    PaginationProtocol { cursor: String },

    /// The backend answered with a non-success status.
    #[error("api error: status {status}: {body}")]
    Api { status: u16, body: String },

    /// The underlying HTTP call failed. Never retried by this layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// True if this error means "the resource does not exist", as opposed
    /// to a transport or data problem.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
