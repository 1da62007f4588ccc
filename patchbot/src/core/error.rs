//! Error taxonomy for the patch engine.
//!
//! Every variant is a caller-input error: the batch is rejected and nothing is
//! retried. `OutOfRange` and `InvalidAddress` stay distinct so callers can tell
//! a bad address from a batch that conflicts with itself.

use thiserror::Error;

/// Failure of a single patch operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// Malformed operation (content/tag mismatch, empty batch).
    #[error("invalid patch: {0}")]
    Validation(String),

    /// Address does not exist in the buffer.
    #[error("address {address} is out of range (buffer has {len} slots)")]
    OutOfRange { address: usize, len: usize },

    /// Address was removed earlier in the same batch.
    #[error("address {address} is already removed")]
    InvalidAddress { address: usize },
}

/// Coarse classification used for exit codes and tool responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchErrorKind {
    Validation,
    OutOfRange,
    InvalidAddress,
}

impl PatchError {
    pub fn kind(&self) -> PatchErrorKind {
        match self {
            PatchError::Validation(_) => PatchErrorKind::Validation,
            PatchError::OutOfRange { .. } => PatchErrorKind::OutOfRange,
            PatchError::InvalidAddress { .. } => PatchErrorKind::InvalidAddress,
        }
    }
}

/// A batch aborted at operation `index` (0-based, in request order).
///
/// Operations before `index` stay applied to the in-memory buffer; the engine
/// never rolls back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("patch #{index} failed: {error}")]
pub struct BatchError {
    pub index: usize,
    pub error: PatchError,
}

impl BatchError {
    pub fn new(index: usize, error: PatchError) -> Self {
        Self { index, error }
    }

    pub fn kind(&self) -> PatchErrorKind {
        self.error.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_message_names_index_and_cause() {
        let err = BatchError::new(1, PatchError::InvalidAddress { address: 0 });
        assert_eq!(
            err.to_string(),
            "patch #1 failed: address 0 is already removed"
        );
        assert_eq!(err.kind(), PatchErrorKind::InvalidAddress);
    }

    #[test]
    fn out_of_range_reports_length() {
        let err = PatchError::OutOfRange { address: 5, len: 3 };
        assert!(err.to_string().contains("buffer has 3 slots"));
        assert_eq!(err.kind(), PatchErrorKind::OutOfRange);
    }
}
