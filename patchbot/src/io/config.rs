//! Bot configuration stored under `.patchbot/config.toml` in the workspace.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Bot configuration (TOML).
///
/// Missing fields default to values suitable for a CI checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BotConfig {
    /// Refuse to load files larger than this many bytes.
    pub max_file_bytes: u64,

    /// Reject tool paths that resolve outside the workspace root.
    pub restrict_to_workspace: bool,

    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Log every diff hunk at debug level (headlines are always logged).
    pub log_diffs: bool,

    /// Markdown file to append action summaries to (e.g. a CI step summary).
    pub summary_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_diffs: true,
            summary_path: None,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 1_000_000,
            restrict_to_workspace: true,
            report: ReportConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_file_bytes == 0 {
            return Err(anyhow!("max_file_bytes must be > 0"));
        }
        if let Some(path) = &self.report.summary_path
            && path.as_os_str().is_empty()
        {
            return Err(anyhow!("report.summary_path must not be empty"));
        }
        Ok(())
    }
}

/// Load the bot config, falling back to defaults when `path` does not exist.
pub fn load_config(path: &Path) -> Result<BotConfig> {
    let cfg = match fs::read_to_string(path) {
        Ok(contents) => {
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
        }
        Err(err) if err.kind() == ErrorKind::NotFound => BotConfig::default(),
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
