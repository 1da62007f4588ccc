//! `readFile`: list a file as addressed lines.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::buffer::LineBuffer;
use crate::io::file_store::FileStore;
use crate::io::report::ChangeReporter;

#[derive(Debug, Clone, Deserialize)]
pub struct ReadFileArgs {
    pub path: PathBuf,
}

/// One line with the address `editFile` expects for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressedLine {
    pub address: usize,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadFileOutput {
    pub lines: Vec<AddressedLine>,
}

pub fn run<S: FileStore + ?Sized>(
    store: &S,
    reporter: &ChangeReporter,
    args: ReadFileArgs,
) -> Result<ReadFileOutput> {
    let content = store.read(&args.path)?;
    // Same split as the patch engine, so addresses line up with editFile.
    let buffer = LineBuffer::load(&content);
    let lines: Vec<AddressedLine> = (0..buffer.len())
        .filter_map(|address| {
            buffer.content(address).map(|line| AddressedLine { address, line })
        })
        .collect();
    reporter.report_read(&args.path, lines.len());
    Ok(ReadFileOutput { lines })
}
