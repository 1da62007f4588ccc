//! Line-patch engine and file tools for a CI coding agent.
//!
//! The agent edits repository files through a handful of tools. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: The address-based patch engine. Pure and deterministic:
//!   load text into a line buffer, apply an ordered batch of patches, render.
//! - **[`io`]**: Side-effecting collaborators (configuration, File Store,
//!   Change Reporter). Isolated behind small types so tests can swap them.
//!
//! [`edit`] coordinates core logic with I/O for one file; [`tools`] exposes
//! the JSON tool-call surface used by the agent loop and the CLI.

pub mod core;
pub mod edit;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
