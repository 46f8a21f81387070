use thiserror::Error;

use crate::value::TypeMismatch;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by walks and projections.
///
/// Cancellation is deliberately absent from this taxonomy: a cancelled
/// iteration surfaces as ordinary exhaustion, and callers that need to tell
/// the two apart check their own token after the loop.
#[derive(Debug, Error)]
pub enum Error {
    /// A produced key cannot be assigned into the destination key type.
    #[error("cannot assign key of type {actual} to map key of type {expected}")]
    KeyType {
        expected: &'static str,
        actual: &'static str,
    },

    /// A produced value cannot be assigned into the destination value type.
    #[error("cannot assign value of type {actual} to destination value of type {expected}")]
    ValueType {
        expected: &'static str,
        actual: &'static str,
    },

    /// A pair's index lies past the end of a fixed-size destination.
    #[error("index {index} out of bounds for destination of length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// A visitor failed while walking a keyed source.
    #[error("failed to visit key {key}: {err:#}")]
    Visit { key: String, err: anyhow::Error },

    /// A visitor failed while walking an indexed source.
    #[error("failed to visit index {index}: {err:#}")]
    VisitIndex { index: usize, err: anyhow::Error },
}

impl Error {
    pub(crate) fn key_type(mismatch: TypeMismatch) -> Self {
        Error::KeyType {
            expected: mismatch.expected,
            actual: mismatch.actual,
        }
    }

    pub(crate) fn value_type(mismatch: TypeMismatch) -> Self {
        Error::ValueType {
            expected: mismatch.expected,
            actual: mismatch.actual,
        }
    }
}
