//! Orchestration for a single `editFile` action.
//!
//! Reads the file, applies the whole batch in memory, and writes the rendered
//! text back only once every patch has succeeded. A rejected batch leaves the
//! file untouched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::buffer::LineBuffer;
use crate::core::change::ChangeRecord;
use crate::core::patch::PatchBatch;
use crate::io::file_store::FileStore;
use crate::io::report::ChangeReporter;

/// Result of a successful edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub path: PathBuf,
    /// One record per patch, in application order.
    pub changes: Vec<ChangeRecord>,
    /// Line count of the written file.
    pub line_count: usize,
    /// Final file content as written.
    pub content: String,
}

/// Apply `batch` to the file at `path`.
#[instrument(skip_all, fields(path = %path.display(), patches = batch.len()))]
pub fn edit_file<S: FileStore + ?Sized>(
    store: &S,
    reporter: &ChangeReporter,
    path: &Path,
    batch: &PatchBatch,
) -> Result<EditOutcome> {
    let original = store.read(path)?;
    let mut buffer = LineBuffer::load(&original);
    let changes = match buffer.apply_batch(batch) {
        Ok(changes) => changes,
        Err(err) => {
            warn!(index = err.index, err = %err.error, "patch batch rejected, file left untouched");
            return Err(err).with_context(|| format!("edit {}", path.display()));
        }
    };
    let content = buffer.render();
    let line_count = buffer.line_count();

    store.write(path, &content)?;
    info!(lines = line_count, "applied patch batch");
    reporter.report_edit(path, batch, &changes, line_count);

    Ok(EditOutcome {
        path: path.to_path_buf(),
        changes,
        line_count,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{BatchError, PatchErrorKind};
    use crate::core::patch::Patch;
    use crate::io::config::ReportConfig;
    use crate::test_support::MemoryStore;

    fn reporter() -> ChangeReporter {
        ChangeReporter::new(&ReportConfig::default())
    }

    fn batch(patches: Vec<Patch>) -> PatchBatch {
        PatchBatch::new(patches).expect("batch")
    }

    #[test]
    fn writes_rendered_content_once() {
        let store = MemoryStore::with_file("a.txt", "a\nb\nc\n");
        let outcome = edit_file(
            &store,
            &reporter(),
            Path::new("a.txt"),
            &batch(vec![Patch::replace(1, "B"), Patch::remove(2)]),
        )
        .expect("edit");

        assert_eq!(store.get("a.txt").as_deref(), Some("a\nB\n"));
        assert_eq!(outcome.content, "a\nB\n");
        assert_eq!(outcome.changes.len(), 2);
        assert_eq!(outcome.line_count, 3);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn rejected_batch_leaves_file_untouched() {
        let store = MemoryStore::with_file("a.txt", "a");
        let err = edit_file(
            &store,
            &reporter(),
            Path::new("a.txt"),
            &batch(vec![Patch::remove(0), Patch::replace(0, "z")]),
        )
        .expect_err("conflict");

        let batch_err = err.downcast_ref::<BatchError>().expect("batch error");
        assert_eq!(batch_err.index, 1);
        assert_eq!(batch_err.kind(), PatchErrorKind::InvalidAddress);
        assert_eq!(store.get("a.txt").as_deref(), Some("a"));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn missing_file_is_reported() {
        let store = MemoryStore::default();
        let err = edit_file(
            &store,
            &reporter(),
            Path::new("missing.txt"),
            &batch(vec![Patch::remove(0)]),
        )
        .expect_err("missing");
        assert!(err.to_string().contains("missing.txt"));
    }
}
