//! File tools exposed to the coding agent.
//!
//! A [`Toolbox`] is built once per task run from an explicit File Store and
//! Change Reporter. Tool-call arguments are checked against each tool's JSON
//! Schema before they are deserialized. [`Toolbox::call`] never fails: errors
//! come back as `{"error": ...}` so the agent can pick a different edit.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::Validator;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::core::error::{BatchError, PatchErrorKind};
use crate::io::file_store::FileStore;
use crate::io::report::ChangeReporter;

pub mod edit_file;
pub mod read_file;
pub mod write_file;

const READ_FILE_SCHEMA: &str = include_str!("schemas/read_file.schema.json");
const EDIT_FILE_SCHEMA: &str = include_str!("schemas/edit_file.schema.json");
const CREATE_FILE_SCHEMA: &str = include_str!("schemas/create_file.schema.json");
const WRITE_FILE_SCHEMA: &str = include_str!("schemas/write_file.schema.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ReadFile,
    EditFile,
    CreateFile,
    WriteFile,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::ReadFile,
        ToolName::EditFile,
        ToolName::CreateFile,
        ToolName::WriteFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ReadFile => "readFile",
            ToolName::EditFile => "editFile",
            ToolName::CreateFile => "createFile",
            ToolName::WriteFile => "writeFile",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ReadFile => {
                "Read a file in the workspace. Returns every line with its 0-based address."
            }
            ToolName::EditFile => {
                "Manipulate the lines of an existing file. Patches are applied in order and the \
                 file is written once at the end. Addresses always refer to the lines as \
                 returned by readFile."
            }
            ToolName::CreateFile => "Create a new file. Fails if the file already exists.",
            ToolName::WriteFile => {
                "Write the content to a file. If the file already exists, it is overwritten."
            }
        }
    }

    fn schema_source(&self) -> &'static str {
        match self {
            ToolName::ReadFile => READ_FILE_SCHEMA,
            ToolName::EditFile => EDIT_FILE_SCHEMA,
            ToolName::CreateFile => CREATE_FILE_SCHEMA,
            ToolName::WriteFile => WRITE_FILE_SCHEMA,
        }
    }

    pub fn schema(&self) -> Result<Value> {
        serde_json::from_str(self.schema_source())
            .with_context(|| format!("parse {} schema", self.as_str()))
    }
}

/// Tool declaration handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn declarations() -> Result<Vec<ToolDeclaration>> {
    ToolName::ALL
        .iter()
        .map(|tool| {
            Ok(ToolDeclaration {
                name: tool.as_str(),
                description: tool.description(),
                parameters: tool.schema()?,
            })
        })
        .collect()
}

pub struct Toolbox<S: FileStore> {
    store: S,
    reporter: ChangeReporter,
    validators: Vec<(ToolName, Validator)>,
}

impl<S: FileStore> Toolbox<S> {
    pub fn new(store: S, reporter: ChangeReporter) -> Result<Self> {
        let validators = ToolName::ALL
            .iter()
            .map(|tool| {
                let schema = tool.schema()?;
                let validator = jsonschema::validator_for(&schema)
                    .map_err(|err| anyhow!("invalid {} schema: {}", tool.as_str(), err))?;
                Ok((*tool, validator))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            store,
            reporter,
            validators,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reporter(&self) -> &ChangeReporter {
        &self.reporter
    }

    /// Run a tool call and always produce a JSON response.
    #[instrument(skip_all, fields(tool = name))]
    pub fn call(&self, name: &str, args: &Value) -> Value {
        match self.try_call(name, args) {
            Ok(value) => value,
            Err(err) => {
                warn!(err = %format!("{err:#}"), "tool call failed");
                error_response(&err)
            }
        }
    }

    /// Run a tool call, propagating failures.
    pub fn try_call(&self, name: &str, args: &Value) -> Result<Value> {
        let tool = ToolName::parse(name).ok_or_else(|| anyhow!("unknown tool '{name}'"))?;
        self.validate_args(tool, args)?;
        debug!("tool arguments accepted");
        match tool {
            ToolName::ReadFile => to_value(read_file::run(
                &self.store,
                &self.reporter,
                parse_args(tool, args)?,
            )?),
            ToolName::EditFile => to_value(edit_file::run(
                &self.store,
                &self.reporter,
                parse_args(tool, args)?,
            )?),
            ToolName::CreateFile => to_value(write_file::create(
                &self.store,
                &self.reporter,
                parse_args(tool, args)?,
            )?),
            ToolName::WriteFile => to_value(write_file::write(
                &self.store,
                &self.reporter,
                parse_args(tool, args)?,
            )?),
        }
    }

    fn validate_args(&self, tool: ToolName, args: &Value) -> Result<()> {
        let Some((_, validator)) = self.validators.iter().find(|(name, _)| *name == tool) else {
            bail!("no schema registered for {}", tool.as_str());
        };
        let messages: Vec<String> = validator
            .iter_errors(args)
            .map(|err| err.to_string())
            .collect();
        if !messages.is_empty() {
            bail!(
                "invalid arguments for {}:\n- {}",
                tool.as_str(),
                messages.join("\n- ")
            );
        }
        Ok(())
    }
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, args: &Value) -> Result<T> {
    T::deserialize(args).with_context(|| format!("parse {} arguments", tool.as_str()))
}

fn to_value<T: Serialize>(output: T) -> Result<Value> {
    serde_json::to_value(output).context("serialize tool output")
}

/// Error payload returned to the agent; patch errors also carry their kind.
pub fn error_response(err: &anyhow::Error) -> Value {
    let message = format!("{err:#}");
    match err.downcast_ref::<BatchError>() {
        Some(batch_err) => json!({
            "error": message,
            "kind": kind_label(batch_err.kind()),
            "patchIndex": batch_err.index,
        }),
        None => json!({ "error": message }),
    }
}

fn kind_label(kind: PatchErrorKind) -> &'static str {
    match kind {
        PatchErrorKind::Validation => "validation",
        PatchErrorKind::OutOfRange => "out_of_range",
        PatchErrorKind::InvalidAddress => "invalid_address",
    }
}
