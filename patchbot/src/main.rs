//! Line-patch file tools for a CI coding agent.
//!
//! Exposes the agent's file tools on the command line so CI steps (and humans
//! debugging a run) can read files by address, apply patch batches, and replay
//! raw tool calls against a checked-out workspace.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

use patchbot::core::change::render_trail;
use patchbot::core::patch::{PatchBatch, PatchRequest};
use patchbot::edit::edit_file;
use patchbot::exit_codes;
use patchbot::io::config::load_config;
use patchbot::io::file_store::WorkspaceStore;
use patchbot::io::report::ChangeReporter;
use patchbot::logging;
use patchbot::tools::read_file::{self, ReadFileArgs};
use patchbot::tools::{Toolbox, declarations, error_response};

#[derive(Parser)]
#[command(
    name = "patchbot",
    version,
    about = "Address-based line patching for a CI coding agent"
)]
struct Cli {
    /// Workspace root that tool paths are resolved against.
    #[arg(long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// Config file (defaults to `<workspace>/.patchbot/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append Markdown action summaries to this file.
    #[arg(long, global = true)]
    summary: Option<PathBuf>,

    /// Log diff hunks and internals.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a file as `address: line` rows.
    Read { path: PathBuf },
    /// Apply a JSON array of patches to a file and print the diff trail.
    Edit {
        path: PathBuf,
        /// Patch file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        patches: String,
    },
    /// Run one tool call and print its JSON response.
    Call {
        tool: String,
        /// JSON arguments file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        args: String,
    },
    /// Print the tool declarations as JSON.
    Tools,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::for_error(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Read { path } => cmd_read(&cli, path),
        Command::Edit { path, patches } => cmd_edit(&cli, path, patches),
        Command::Call { tool, args } => cmd_call(&cli, tool, args),
        Command::Tools => cmd_tools(),
    }
}

fn cmd_read(cli: &Cli, path: &Path) -> Result<()> {
    let toolbox = open_toolbox(cli)?;
    let out = read_file::run(
        toolbox.store(),
        toolbox.reporter(),
        ReadFileArgs {
            path: path.to_path_buf(),
        },
    )?;
    for line in out.lines {
        println!("{}: {}", line.address, line.line);
    }
    Ok(())
}

fn cmd_edit(cli: &Cli, path: &Path, patches: &str) -> Result<()> {
    let raw = read_input(patches)?;
    let requests: Vec<PatchRequest> =
        serde_json::from_str(&raw).context("parse patches as a JSON array")?;
    let batch = PatchBatch::from_requests(requests)?;
    let toolbox = open_toolbox(cli)?;
    let outcome = edit_file(toolbox.store(), toolbox.reporter(), path, &batch)?;
    println!("{}", render_trail(&outcome.changes));
    Ok(())
}

fn cmd_call(cli: &Cli, tool: &str, args: &str) -> Result<()> {
    let raw = read_input(args)?;
    let args: Value = serde_json::from_str(&raw).context("parse tool arguments as JSON")?;
    let toolbox = open_toolbox(cli)?;
    // Print the error payload the agent would see, but keep the typed error for the exit code.
    let (response, result) = match toolbox.try_call(tool, &args) {
        Ok(response) => (response, Ok(())),
        Err(err) => (error_response(&err), Err(err)),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("serialize tool response")?
    );
    result
}

fn cmd_tools() -> Result<()> {
    let decls = declarations()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&decls).context("serialize declarations")?
    );
    Ok(())
}

/// Build the per-run toolbox from CLI flags and the workspace config.
fn open_toolbox(cli: &Cli) -> Result<Toolbox<WorkspaceStore>> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.workspace.join(".patchbot").join("config.toml"));
    let cfg = load_config(&config_path)?;
    let store = WorkspaceStore::new(&cli.workspace, &cfg)?;
    let reporter = ChangeReporter::new(&cfg.report).with_summary_path(cli.summary.clone());
    Toolbox::new(store, reporter)
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(source).with_context(|| format!("read {source}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_edit_defaults_to_stdin() {
        let cli = Cli::parse_from(["patchbot", "edit", "src/lib.rs"]);
        assert!(matches!(
            cli.command,
            Command::Edit { ref patches, .. } if patches == "-"
        ));
        assert_eq!(cli.workspace, PathBuf::from("."));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "patchbot",
            "read",
            "a.txt",
            "--workspace",
            "/repo",
            "--summary",
            "summary.md",
            "-v",
        ]);
        assert!(matches!(cli.command, Command::Read { .. }));
        assert_eq!(cli.workspace, PathBuf::from("/repo"));
        assert_eq!(cli.summary, Some(PathBuf::from("summary.md")));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_call_with_args_file() {
        let cli = Cli::parse_from(["patchbot", "call", "editFile", "--args", "call.json"]);
        assert!(matches!(
            cli.command,
            Command::Call { ref tool, ref args } if tool == "editFile" && args == "call.json"
        ));
    }
}
