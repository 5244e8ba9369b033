//! Three-state result protocol for remote-backed operations
//!
//! Every repository call yields `Loading` first, then exactly one terminal
//! state, then nothing further for that invocation. Streams are cold: each
//! call builds a fresh invocation and nothing is cached or replayed to later
//! subscribers.

use futures::stream::BoxStream;

/// Type alias for repository result streams
pub type ResultStream<'a, T> = BoxStream<'a, ResultState<T>>;

/// Outcome of a single repository invocation at a point in time.
///
/// `Error` carries a human-readable diagnostic, not a typed error code;
/// presentation layers display it verbatim and must re-invoke the operation
/// to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultState<T> {
    /// The operation has started and no terminal outcome exists yet.
    Loading,

    /// Terminal: the operation completed and produced a payload.
    Success(T),

    /// Terminal: the operation failed with a displayable message.
    Error(String),
}

impl<T> ResultState<T> {
    /// True while no terminal state has been reached.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// True for the successful terminal state.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// True for the failed terminal state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Consume the state, returning the success payload if present.
    pub fn into_success(self) -> Option<T> {
        match self {
            Self::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// The error message, if this is the failed terminal state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}
