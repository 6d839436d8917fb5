//! Error types for a replay run

use crate::transport::TransportError;
use thiserror::Error;

/// Result type for dispatcher operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors that end a run
///
/// Cancellation is not an error: an interrupted run returns
/// [`RunOutcome::Aborted`](crate::RunOutcome::Aborted).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No response could be obtained from a host
    #[error("could not connect to server {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The dispatcher was configured with unusable values
    #[error("invalid dispatcher configuration: {0}")]
    InvalidConfig(String),

    /// `run` was called on a dispatcher that already ran
    #[error("dispatcher has already been started")]
    AlreadyStarted,
}
