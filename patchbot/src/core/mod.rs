//! Deterministic, pure logic of the line-patch engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! buffers and return deterministic outputs suitable for tests.

pub mod buffer;
pub mod change;
pub mod error;
pub mod patch;

pub use buffer::{LineBuffer, Slot};
pub use change::{ChangeRecord, render_trail};
pub use error::{BatchError, PatchError, PatchErrorKind};
pub use patch::{Edit, Operation, Patch, PatchBatch, PatchRequest};
