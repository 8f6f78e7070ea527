//! Error types for array operations

use thiserror::Error;

use crate::kind::ArrayKind;

/// Error type for polyarray
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    /// The representation backing the array does not provide this operation.
    ///
    /// This is the only recoverable kind: a caller may escalate the array to a
    /// more general representation and retry.
    #[error("unimplemented {kind}::{op}")]
    Unimplemented {
        /// Representation that was asked to perform the operation
        kind: ArrayKind,
        /// Name of the dispatch row
        op: &'static str,
    },
    /// A key was neither an integer nor a string
    #[error("illegal offset type: {0}")]
    InvalidKey(&'static str),
    /// Comparison or serialization nested deeper than the configured limit
    #[error("nesting level too deep - recursive dependency? (limit {0})")]
    RecursionLimit(usize),
    /// A core invariant was already broken upstream
    #[error("internal consistency violation: {0}")]
    Internal(String),
    /// The array holds references and cannot be interned as a scalar
    #[error("array contains references and cannot become a scalar array")]
    NotScalar,
    /// Process-wide state was initialized twice
    #[error("array runtime is already initialized")]
    AlreadyInitialized,
}

impl ArrayError {
    pub(crate) fn unimplemented(kind: ArrayKind, op: &'static str) -> Self {
        Self::Unimplemented { kind, op }
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns `true` unless the error only signals a missing capability.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns `true` for [`ArrayError::Unimplemented`].
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unimplemented { .. })
    }
}

/// Result type used throughout the crate
pub type Result<T, E = ArrayError> = std::result::Result<T, E>;
