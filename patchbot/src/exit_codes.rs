//! Stable exit codes for patchbot CLI commands.

use crate::core::error::{BatchError, PatchErrorKind};

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to I/O, config, arguments or other errors.
pub const INVALID: i32 = 1;
/// Patch batch rejected: malformed patch or address out of range.
pub const REJECTED: i32 = 2;
/// Patch batch conflicts with itself (address already removed).
pub const CONFLICT: i32 = 3;

/// Map an error to its exit code.
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<BatchError>().map(BatchError::kind) {
        Some(PatchErrorKind::Validation | PatchErrorKind::OutOfRange) => REJECTED,
        Some(PatchErrorKind::InvalidAddress) => CONFLICT,
        None => INVALID,
    }
}
