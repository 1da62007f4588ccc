//! Address-stable line buffer.
//!
//! Addresses identify lines of the *original* text for the whole batch. INSERT
//! and APPEND never splice: they grow the lines held by one slot, and the extra
//! lines only materialize when [`LineBuffer::render`] joins the slots. REMOVE
//! leaves a tombstone so later patches still see the same addresses.

use tracing::debug;

use super::change::ChangeRecord;
use super::error::{BatchError, PatchError};
use super::patch::{Edit, Patch, PatchBatch};

/// One addressable slot.
///
/// Inserted text accumulates in `leading` (before the line) and appended text
/// in `trailing` (after it), each in application order. `line` is `None` once
/// the original line is gone. A slot with nothing left is a tombstone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    leading: Vec<String>,
    line: Option<String>,
    trailing: Vec<String>,
}

impl Slot {
    fn line(text: &str) -> Self {
        Self {
            line: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn is_removed(&self) -> bool {
        self.line.is_none() && self.leading.is_empty() && self.trailing.is_empty()
    }

    /// Slot text as it will be rendered, or `None` for a tombstone.
    pub fn content(&self) -> Option<String> {
        if self.is_removed() {
            return None;
        }
        let parts: Vec<&str> = self
            .leading
            .iter()
            .map(String::as_str)
            .chain(self.line.as_deref())
            .chain(self.trailing.iter().map(String::as_str))
            .collect();
        Some(parts.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    slots: Vec<Slot>,
    /// Slot count at load time; the only address past it is the end-of-file slot.
    original_len: usize,
}

impl LineBuffer {
    /// Split `content` on `\n`; slot `i` holds line `i` verbatim.
    ///
    /// A trailing `\n` yields an empty last slot, so render(load(s)) == s.
    pub fn load(content: &str) -> Self {
        let slots: Vec<Slot> = content.split('\n').map(Slot::line).collect();
        Self {
            original_len: slots.len(),
            slots,
        }
    }

    /// Number of slots loaded from the original text.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Number of slots (tombstones and the end-of-file slot included).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, address: usize) -> Option<&Slot> {
        self.slots.get(address)
    }

    /// Present content at `address`, or `None` if out of range or removed.
    pub fn content(&self, address: usize) -> Option<String> {
        self.slot(address).and_then(Slot::content)
    }

    /// Apply one patch in place and record what changed.
    pub fn apply(&mut self, patch: &Patch) -> Result<ChangeRecord, PatchError> {
        let address = patch.address;
        let out_of_range = PatchError::OutOfRange {
            address,
            len: self.original_len,
        };

        // Only INSERT may target one past the original end, and all such
        // inserts share a single end-of-file slot.
        if address >= self.original_len {
            if address > self.original_len || !matches!(patch.edit, Edit::Insert(_)) {
                return Err(out_of_range);
            }
            if self.slots.len() == self.original_len {
                debug!(address, "insert past last line opens the end-of-file slot");
                self.slots.push(Slot::default());
            }
        }

        let slot = self.slots.get_mut(address).ok_or(out_of_range)?;
        let before = slot.content();

        match &patch.edit {
            Edit::Replace(_) | Edit::Remove if before.is_none() => {
                return Err(PatchError::InvalidAddress { address });
            }
            Edit::Replace(new) => *slot = Slot::line(new),
            Edit::Insert(new) => slot.leading.push(new.clone()),
            Edit::Append(new) => slot.trailing.push(new.clone()),
            Edit::Remove => *slot = Slot::default(),
        }

        Ok(ChangeRecord {
            address,
            operation: patch.operation(),
            before,
            after: slot.content(),
        })
    }

    /// Apply every patch in order, stopping at the first failure.
    ///
    /// Patches applied before the failing one are not rolled back.
    pub fn apply_batch(&mut self, batch: &PatchBatch) -> Result<Vec<ChangeRecord>, BatchError> {
        let mut records = Vec::with_capacity(batch.len());
        for (index, patch) in batch.patches().iter().enumerate() {
            let record = self.apply(patch).map_err(|err| {
                debug!(index, address = patch.address, err = %err, "patch rejected");
                BatchError::new(index, err)
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Join present slots with `\n`, dropping tombstones.
    pub fn render(&self) -> String {
        self.slots
            .iter()
            .filter_map(Slot::content)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of physical lines `render` would produce.
    pub fn line_count(&self) -> usize {
        self.slots
            .iter()
            .filter_map(Slot::content)
            .map(|content| content.split('\n').count())
            .sum()
    }
}
