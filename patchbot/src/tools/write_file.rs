//! `createFile` and `writeFile`: whole-file writes through the File Store.

use std::path::PathBuf;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::io::file_store::FileStore;
use crate::io::report::ChangeReporter;

#[derive(Debug, Clone, Deserialize)]
pub struct FileContentArgs {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateFileOutput {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFileOutput {
    pub ok: bool,
}

/// Create a new file; fails if something already exists at `path`.
pub fn create<S: FileStore + ?Sized>(
    store: &S,
    reporter: &ChangeReporter,
    args: FileContentArgs,
) -> Result<CreateFileOutput> {
    if store.exists(&args.path)? {
        bail!(
            "{} already exists (use editFile or writeFile)",
            args.path.display()
        );
    }
    store.write(&args.path, &args.content)?;
    reporter.report_create(&args.path, &args.content);
    Ok(CreateFileOutput { path: args.path })
}

/// Write `content` to `path`, replacing any existing file.
pub fn write<S: FileStore + ?Sized>(
    store: &S,
    reporter: &ChangeReporter,
    args: FileContentArgs,
) -> Result<WriteFileOutput> {
    store.write(&args.path, &args.content)?;
    reporter.report_write(&args.path, &args.content);
    Ok(WriteFileOutput { ok: true })
}
