//! Test-only helpers: an in-memory File Store and a temp workspace.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::io::config::{BotConfig, ReportConfig};
use crate::io::file_store::{FileStore, WorkspaceStore};
use crate::io::report::ChangeReporter;
use crate::tools::Toolbox;

/// In-memory File Store that counts reads and writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, String>>,
    reads: Cell<usize>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn with_file(path: &str, content: &str) -> Self {
        let store = Self::default();
        store
            .files
            .borrow_mut()
            .insert(PathBuf::from(path), content.to_string());
        store
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.borrow().get(Path::new(path)).cloned()
    }

    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<String> {
        self.reads.set(self.reads.get() + 1);
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("read {}: no such file", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.borrow().contains_key(path))
    }
}

/// Temporary on-disk workspace for integration tests.
pub struct TestWorkspace {
    temp: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path().join(rel))?)
    }

    /// Toolbox over this workspace with default config and an optional summary file.
    pub fn toolbox(&self, summary_path: Option<PathBuf>) -> Result<Toolbox<WorkspaceStore>> {
        let cfg = BotConfig {
            report: ReportConfig {
                summary_path,
                ..ReportConfig::default()
            },
            ..BotConfig::default()
        };
        let store = WorkspaceStore::new(self.path(), &cfg)?;
        Toolbox::new(store, ChangeReporter::new(&cfg.report))
    }
}
