//! Patch operations and batches.
//!
//! A [`PatchRequest`] is the wire shape sent by the agent. It is converted into
//! a validated [`Patch`] before anything touches a buffer, so a REMOVE carrying
//! content (or a REPLACE without it) never reaches the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{BatchError, PatchError};

/// Operation tag of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Replace the slot content.
    Replace,
    /// Put new content before the slot content.
    Insert,
    /// Put new content after the slot content.
    Append,
    /// Tombstone the slot; it is dropped on render.
    Remove,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Replace => "REPLACE",
            Operation::Insert => "INSERT",
            Operation::Append => "APPEND",
            Operation::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated patch as received from a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    /// 0-based address into the original buffer.
    pub address: usize,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
}

/// Validated edit payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Replace(String),
    Insert(String),
    Append(String),
    Remove,
}

impl Edit {
    pub fn operation(&self) -> Operation {
        match self {
            Edit::Replace(_) => Operation::Replace,
            Edit::Insert(_) => Operation::Insert,
            Edit::Append(_) => Operation::Append,
            Edit::Remove => Operation::Remove,
        }
    }

    pub fn new_content(&self) -> Option<&str> {
        match self {
            Edit::Replace(content) | Edit::Insert(content) | Edit::Append(content) => {
                Some(content.as_str())
            }
            Edit::Remove => None,
        }
    }
}

/// A single validated patch targeting one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub address: usize,
    pub edit: Edit,
}

impl Patch {
    pub fn replace(address: usize, content: impl Into<String>) -> Self {
        Self {
            address,
            edit: Edit::Replace(content.into()),
        }
    }

    pub fn insert(address: usize, content: impl Into<String>) -> Self {
        Self {
            address,
            edit: Edit::Insert(content.into()),
        }
    }

    pub fn append(address: usize, content: impl Into<String>) -> Self {
        Self {
            address,
            edit: Edit::Append(content.into()),
        }
    }

    pub fn remove(address: usize) -> Self {
        Self {
            address,
            edit: Edit::Remove,
        }
    }

    pub fn operation(&self) -> Operation {
        self.edit.operation()
    }
}

impl TryFrom<PatchRequest> for Patch {
    type Error = PatchError;

    fn try_from(request: PatchRequest) -> Result<Self, Self::Error> {
        let PatchRequest {
            address,
            operation,
            new_content,
        } = request;
        let edit = match (operation, new_content) {
            (Operation::Replace, Some(content)) => Edit::Replace(content),
            (Operation::Insert, Some(content)) => Edit::Insert(content),
            (Operation::Append, Some(content)) => Edit::Append(content),
            (Operation::Remove, None) => Edit::Remove,
            (Operation::Remove, Some(_)) => {
                return Err(PatchError::Validation(format!(
                    "newContent must be omitted for REMOVE operation (address {address})"
                )));
            }
            (op, None) => {
                return Err(PatchError::Validation(format!(
                    "newContent must be defined for {op} operation (address {address})"
                )));
            }
        };
        Ok(Patch { address, edit })
    }
}

impl From<&Patch> for PatchRequest {
    fn from(patch: &Patch) -> Self {
        Self {
            address: patch.address,
            operation: patch.operation(),
            new_content: patch.edit.new_content().map(str::to_string),
        }
    }
}

/// Non-empty, fully validated, ordered list of patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchBatch {
    patches: Vec<Patch>,
}

impl PatchBatch {
    pub fn new(patches: Vec<Patch>) -> Result<Self, BatchError> {
        if patches.is_empty() {
            return Err(BatchError::new(
                0,
                PatchError::Validation("batch must contain at least one patch".to_string()),
            ));
        }
        Ok(Self { patches })
    }

    /// Validate every request before accepting any of them.
    pub fn from_requests(requests: Vec<PatchRequest>) -> Result<Self, BatchError> {
        let patches = requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| {
                Patch::try_from(request).map_err(|err| BatchError::new(index, err))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(patches)
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn to_requests(&self) -> Vec<PatchRequest> {
        self.patches.iter().map(PatchRequest::from).collect()
    }
}
