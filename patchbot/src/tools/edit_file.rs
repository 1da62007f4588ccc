//! `editFile`: apply a batch of line patches to an existing file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::patch::{Operation, PatchBatch, PatchRequest};
use crate::edit::edit_file;
use crate::io::file_store::FileStore;
use crate::io::report::ChangeReporter;

#[derive(Debug, Clone, Deserialize)]
pub struct EditFileArgs {
    pub path: PathBuf,
    pub patches: Vec<PatchRequest>,
}

/// Per-patch diff returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub address: usize,
    pub operation: Operation,
    pub diff: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditFileOutput {
    pub changes: Vec<AppliedChange>,
    /// Line count of the file after the edit.
    pub lines: usize,
}

pub fn run<S: FileStore + ?Sized>(
    store: &S,
    reporter: &ChangeReporter,
    args: EditFileArgs,
) -> Result<EditFileOutput> {
    let batch = PatchBatch::from_requests(args.patches)?;
    let outcome = edit_file(store, reporter, &args.path, &batch)?;
    Ok(EditFileOutput {
        changes: outcome
            .changes
            .iter()
            .map(|change| AppliedChange {
                address: change.address,
                operation: change.operation,
                diff: change.diff(),
            })
            .collect(),
        lines: outcome.line_count,
    })
}
