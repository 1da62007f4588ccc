//! Change Reporter: renders tool actions into logs and a Markdown summary.
//!
//! # Separation of Concerns
//!
//! - **Tracing**: every action logs a headline at `info`; diff hunks go to
//!   `debug` when `report.log_diffs` is on.
//! - **Step summary**: when a summary path is configured, each action appends
//!   a Markdown section (the CI job summary shown next to the pull request).
//!   A failure to append is logged and never fails the action itself.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use tracing::{debug, info, warn};

use super::config::ReportConfig;
use crate::core::change::ChangeRecord;
use crate::core::patch::PatchBatch;

const SUMMARY_TEMPLATE: &str = include_str!("templates/summary.md");

/// Reported tool action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Edit,
    Create,
    Write,
}

impl Action {
    fn heading(&self, line_count: Option<usize>) -> String {
        let label = match self {
            Action::Read => "Read a file",
            Action::Edit => "Edit a file",
            Action::Create => "Create a new file",
            Action::Write => "Write a file",
        };
        match line_count {
            Some(n) => format!("{label} ({n} lines)"),
            None => label.to_string(),
        }
    }
}

pub struct ChangeReporter {
    log_diffs: bool,
    summary_path: Option<PathBuf>,
    env: Environment<'static>,
}

impl ChangeReporter {
    pub fn new(cfg: &ReportConfig) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template("summary.md", SUMMARY_TEMPLATE)
            .expect("summary template should be valid");
        Self {
            log_diffs: cfg.log_diffs,
            summary_path: cfg.summary_path.clone(),
            env,
        }
    }

    /// Override the summary destination (e.g. from a CLI flag).
    pub fn with_summary_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.summary_path = path;
        }
        self
    }

    pub fn summary_path(&self) -> Option<&Path> {
        self.summary_path.as_deref()
    }

    pub fn report_read(&self, path: &Path, line_count: usize) {
        info!(path = %path.display(), lines = line_count, "read file");
        self.append_or_warn(Action::Read, path, Some(line_count), None, None, &[]);
    }

    /// Report an applied batch: the requested patches as JSON, then one hunk per record.
    pub fn report_edit(
        &self,
        path: &Path,
        batch: &PatchBatch,
        records: &[ChangeRecord],
        line_count: usize,
    ) {
        info!(
            path = %path.display(),
            patches = records.len(),
            lines = line_count,
            "edited file"
        );
        let patches = match serde_json::to_string_pretty(&batch.to_requests()) {
            Ok(json) => {
                debug!(patches = %json, "patch batch");
                Some(json)
            }
            Err(err) => {
                warn!(err = %err, "failed to serialize patch batch");
                None
            }
        };
        let hunks: Vec<String> = records.iter().map(ChangeRecord::render_hunk).collect();
        if self.log_diffs {
            for hunk in &hunks {
                debug!("{hunk}");
            }
        }
        self.append_or_warn(
            Action::Edit,
            path,
            Some(line_count),
            patches.as_deref(),
            None,
            &hunks,
        );
    }

    pub fn report_create(&self, path: &Path, content: &str) {
        info!(path = %path.display(), bytes = content.len(), "created file");
        self.append_or_warn(Action::Create, path, None, None, Some(content), &[]);
    }

    pub fn report_write(&self, path: &Path, content: &str) {
        info!(path = %path.display(), bytes = content.len(), "wrote file");
        self.append_or_warn(Action::Write, path, None, None, Some(content), &[]);
    }

    /// Render one Markdown summary section.
    pub fn render_section(
        &self,
        action: Action,
        path: &Path,
        line_count: Option<usize>,
        patches: Option<&str>,
        body: Option<&str>,
        hunks: &[String],
    ) -> Result<String> {
        let template = self.env.get_template("summary.md")?;
        let rendered = template.render(context! {
            heading => action.heading(line_count),
            path => path.display().to_string(),
            patches => patches,
            body => body.map(|b| b.trim_end_matches('\n')).filter(|b| !b.is_empty()),
            hunks => hunks,
        })?;
        Ok(rendered)
    }

    fn append_or_warn(
        &self,
        action: Action,
        path: &Path,
        line_count: Option<usize>,
        patches: Option<&str>,
        body: Option<&str>,
        hunks: &[String],
    ) {
        let Some(summary_path) = &self.summary_path else {
            return;
        };
        let result = self
            .render_section(action, path, line_count, patches, body, hunks)
            .and_then(|section| append_text(summary_path, &section));
        if let Err(err) = result {
            warn!(
                summary = %summary_path.display(),
                err = %format!("{err:#}"),
                "failed to append step summary"
            );
        }
    }
}

fn append_text(path: &Path, section: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open summary {}", path.display()))?;
    writeln!(file, "{section}").with_context(|| format!("append summary {}", path.display()))
}
