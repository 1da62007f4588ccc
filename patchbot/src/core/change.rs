//! Change records and their diff rendering.

use serde::Serialize;

use super::patch::Operation;

/// Before/after snapshot of one applied patch.
///
/// `None` stands for a tombstone: `before` is `None` when the slot had been
/// removed earlier in the batch, `after` is `None` for a REMOVE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub address: usize,
    pub operation: Operation,
    pub before: Option<String>,
    pub after: Option<String>,
}

impl ChangeRecord {
    pub fn hunk_header(&self) -> String {
        format!("@@ {} @@", self.address)
    }

    /// Diff body lines (`- ` removed, `+ ` added, two spaces for context).
    ///
    /// Multi-line slot content is split so each physical line gets a prefix.
    /// REPLACE always shows the whole slot as removed then added; other
    /// operations keep the lines shared by `before` and `after` as context.
    pub fn diff_lines(&self) -> Vec<String> {
        let before: Vec<&str> = self.before.as_deref().map(split_lines).unwrap_or_default();
        let after: Vec<&str> = self.after.as_deref().map(split_lines).unwrap_or_default();

        if self.operation == Operation::Replace {
            return before
                .iter()
                .map(|line| prefixed('-', line))
                .chain(after.iter().map(|line| prefixed('+', line)))
                .collect();
        }

        let shared_head = before
            .iter()
            .zip(&after)
            .take_while(|(old, new)| old == new)
            .count();
        let shared_tail = before[shared_head..]
            .iter()
            .rev()
            .zip(after[shared_head..].iter().rev())
            .take_while(|(old, new)| old == new)
            .count();

        let mut out = Vec::with_capacity(before.len() + after.len());
        out.extend(before[..shared_head].iter().map(|line| prefixed(' ', line)));
        out.extend(
            before[shared_head..before.len() - shared_tail]
                .iter()
                .map(|line| prefixed('-', line)),
        );
        out.extend(
            after[shared_head..after.len() - shared_tail]
                .iter()
                .map(|line| prefixed('+', line)),
        );
        out.extend(
            before[before.len() - shared_tail..]
                .iter()
                .map(|line| prefixed(' ', line)),
        );
        out
    }

    /// Diff body joined with newlines, without the hunk header.
    pub fn diff(&self) -> String {
        self.diff_lines().join("\n")
    }

    /// Hunk header followed by the diff body.
    pub fn render_hunk(&self) -> String {
        let mut out = self.hunk_header();
        for line in self.diff_lines() {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }
}

/// Render a full diff trail, one hunk per record, in application order.
pub fn render_trail(records: &[ChangeRecord]) -> String {
    records
        .iter()
        .map(ChangeRecord::render_hunk)
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

fn prefixed(prefix: char, line: &str) -> String {
    if line.is_empty() {
        match prefix {
            ' ' => String::new(),
            _ => prefix.to_string(),
        }
    } else {
        format!("{prefix} {line}")
    }
}
