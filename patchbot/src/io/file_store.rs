//! File Store: the only place the bot touches repository files.
//!
//! Tools resolve every path through a [`FileStore`] so the patch engine stays
//! pure and tests can swap in an in-memory store.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use super::config::BotConfig;

/// Read/write access to text files addressed by path.
pub trait FileStore {
    /// Read the whole file as UTF-8. The file must exist.
    fn read(&self, path: &Path) -> Result<String>;
    /// Replace the file content (creating it and its parent directories).
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn exists(&self, path: &Path) -> Result<bool>;
}

/// Filesystem store rooted at a checked-out workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
    restrict_to_workspace: bool,
    max_file_bytes: u64,
}

impl WorkspaceStore {
    /// Open a store rooted at `root` (which must be an existing directory).
    pub fn new(root: impl AsRef<Path>, cfg: &BotConfig) -> Result<Self> {
        let root = root.as_ref();
        let root = fs::canonicalize(root)
            .with_context(|| format!("resolve workspace {}", root.display()))?;
        if !root.is_dir() {
            bail!("workspace {} is not a directory", root.display());
        }
        Ok(Self {
            root,
            restrict_to_workspace: cfg.restrict_to_workspace,
            max_file_bytes: cfg.max_file_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` against the workspace root.
    ///
    /// Relative paths are joined to the root and `.`/`..` are folded
    /// lexically. The longest existing prefix is then canonicalized so
    /// symlinks are followed. With `restrict_to_workspace`, the result must
    /// stay under the root.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let resolved = canonicalize_existing(&normalize(&joined))?;
        if self.restrict_to_workspace && !resolved.starts_with(&self.root) {
            warn!(path = %path.display(), "path escapes workspace");
            return Err(anyhow!(
                "path {} is outside the workspace {}",
                path.display(),
                self.root.display()
            ));
        }
        Ok(resolved)
    }
}

impl FileStore for WorkspaceStore {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn read(&self, path: &Path) -> Result<String> {
        let resolved = self.resolve(path)?;
        let meta = fs::metadata(&resolved)
            .with_context(|| format!("stat {}", resolved.display()))?;
        if !meta.is_file() {
            bail!("{} is not a file", resolved.display());
        }
        if meta.len() > self.max_file_bytes {
            bail!(
                "{} is {} bytes, above the {} byte limit",
                resolved.display(),
                meta.len(),
                self.max_file_bytes
            );
        }
        let content = fs::read_to_string(&resolved)
            .with_context(|| format!("read {}", resolved.display()))?;
        debug!(bytes = content.len(), "read file");
        Ok(content)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let resolved = self.resolve(path)?;
        write_atomic(&resolved, content)?;
        debug!(bytes = content.len(), "wrote file");
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.resolve(path)?.exists())
    }
}

/// Write via a temp file in the same directory, then rename over `path`.
///
/// An existing file keeps its permissions.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp file for {}", path.display()))?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .with_context(|| format!("copy permissions of {}", path.display()))?;
    }
    tmp.persist(path)
        .with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and re-attach the rest.
///
/// `path` must already be normalized (no `.` or `..`).
fn canonicalize_existing(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(mut out) => {
                out.extend(missing.iter().rev());
                return Ok(out);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                if fs::symlink_metadata(existing).is_ok() {
                    bail!("{} is a dangling symlink", existing.display());
                }
                let (Some(name), Some(parent)) = (existing.file_name(), existing.parent()) else {
                    return Err(err).with_context(|| format!("resolve {}", path.display()));
                };
                missing.push(name);
                existing = parent;
            }
            Err(err) => return Err(err).with_context(|| format!("resolve {}", path.display())),
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(root: &Path) -> WorkspaceStore {
        WorkspaceStore::new(root, &BotConfig::default()).expect("store")
    }

    #[test]
    fn write_then_read_relative_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(temp.path());
        store
            .write(Path::new("src/lib.rs"), "fn main() {}\n")
            .expect("write");
        assert!(store.exists(Path::new("src/lib.rs")).expect("exists"));
        assert_eq!(
            store.read(Path::new("./src/../src/lib.rs")).expect("read"),
            "fn main() {}\n"
        );
        let entries = fs::read_dir(store.root().join("src")).expect("read dir").count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = store(temp.path())
            .read(Path::new("nope.txt"))
            .expect_err("missing");
        assert!(format!("{err:#}").contains("nope.txt"));
    }

    #[test]
    fn rejects_paths_outside_workspace() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(temp.path());
        let err = store
            .resolve(Path::new("../escape.txt"))
            .expect_err("escape");
        assert!(err.to_string().contains("outside the workspace"));
        assert!(store.resolve(Path::new("/etc/hosts")).is_err());
    }

    #[test]
    fn unrestricted_store_allows_outside_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = BotConfig {
            restrict_to_workspace: false,
            ..BotConfig::default()
        };
        let store = WorkspaceStore::new(temp.path(), &cfg).expect("store");
        assert!(store.resolve(Path::new("../escape.txt")).is_ok());
    }

    #[test]
    fn refuses_files_above_size_limit() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = BotConfig {
            max_file_bytes: 4,
            ..BotConfig::default()
        };
        let store = WorkspaceStore::new(temp.path(), &cfg).expect("store");
        fs::write(temp.path().join("big.txt"), "0123456789").expect("write");
        let err = store.read(Path::new("big.txt")).expect_err("too large");
        assert!(err.to_string().contains("byte limit"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_workspace_is_rejected() {
        let workspace = tempfile::tempdir().expect("workspace");
        let outside = tempfile::tempdir().expect("outside");
        fs::write(outside.path().join("secret.txt"), "secret").expect("seed");
        std::os::unix::fs::symlink(outside.path(), workspace.path().join("link"))
            .expect("symlink");
        let store = store(workspace.path());

        let err = store
            .read(Path::new("link/secret.txt"))
            .expect_err("read through link");
        assert!(err.to_string().contains("outside the workspace"));
        assert!(store.write(Path::new("link/new.txt"), "x").is_err());
        assert!(!outside.path().join("new.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_not_written_through() {
        let workspace = tempfile::tempdir().expect("workspace");
        let outside = tempfile::tempdir().expect("outside");
        let target = outside.path().join("target.txt");
        std::os::unix::fs::symlink(&target, workspace.path().join("dangling.txt"))
            .expect("symlink");
        let store = store(workspace.path());

        assert!(store.write(Path::new("dangling.txt"), "x").is_err());
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_workspace_is_followed() {
        let workspace = tempfile::tempdir().expect("workspace");
        fs::create_dir(workspace.path().join("real")).expect("mkdir");
        std::os::unix::fs::symlink(
            workspace.path().join("real"),
            workspace.path().join("alias"),
        )
        .expect("symlink");
        let store = store(workspace.path());

        store.write(Path::new("alias/a.txt"), "a").expect("write");
        assert_eq!(
            fs::read_to_string(workspace.path().join("real/a.txt")).expect("read"),
            "a"
        );
    }

    /// Absolute paths spelled through a symlinked prefix of the root are inside.
    #[cfg(unix)]
    #[test]
    fn absolute_path_through_symlinked_root_is_accepted() {
        let workspace = tempfile::tempdir().expect("workspace");
        let links = tempfile::tempdir().expect("links");
        let alias = links.path().join("ws");
        std::os::unix::fs::symlink(workspace.path(), &alias).expect("symlink");
        fs::write(workspace.path().join("a.txt"), "a").expect("seed");
        let store = store(workspace.path());

        assert_eq!(store.read(&alias.join("a.txt")).expect("read"), "a");
        store.write(&alias.join("b.txt"), "b").expect("write");
        assert!(workspace.path().join("b.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("run.sh");
        fs::write(&path, "echo hi\n").expect("seed");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");

        store(temp.path())
            .write(Path::new("run.sh"), "echo bye\n")
            .expect("write");
        let mode = fs::metadata(&path).expect("meta").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(fs::read_to_string(&path).expect("read"), "echo bye\n");
    }
}
