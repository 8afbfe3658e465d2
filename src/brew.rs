//! Adapter over the `brew` command-line tool.
//!
//! Everything that touches Homebrew goes through [`PackageTool`]. Read-only
//! lookups are [`Query`]s and may run concurrently; state changes are
//! [`Mutation`]s, which callers issue one at a time.

use crate::config::{Item, Kind};
use crate::error::ToolError;
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Read-only lookup against Homebrew's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// `brew list --<kind>`: one installed name per line.
    Installed(Kind),
    /// `brew info --<kind> <name>`
    Info(&'a Item),
    /// `brew info [--cask] --caveats <name>`
    Caveats(&'a Item),
    /// `brew outdated --<kind> --quiet`: one outdated name per line.
    Outdated(Kind),
}

impl Query<'_> {
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            Query::Installed(kind) => {
                args.push("list".to_string());
                args.push(kind.flag().to_string());
            }
            Query::Info(item) => {
                args.push("info".to_string());
                args.push(item.kind.flag().to_string());
                args.push(item.name.clone());
            }
            Query::Caveats(item) => {
                args.push("info".to_string());
                if item.kind == Kind::Cask {
                    args.push("--cask".to_string());
                }
                args.push("--caveats".to_string());
                args.push(item.name.clone());
            }
            Query::Outdated(kind) => {
                args.push("outdated".to_string());
                args.push(kind.flag().to_string());
                args.push("--quiet".to_string());
            }
        }
        args
    }
}

/// Batched state change. One mutation is one `brew` process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation<'a> {
    Update,
    Upgrade(&'a [String]),
    Install(Kind, &'a [String]),
}

impl Mutation<'_> {
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            Mutation::Update => args.push("update".to_string()),
            Mutation::Upgrade(names) => {
                args.push("upgrade".to_string());
                args.extend(names.iter().cloned());
            }
            Mutation::Install(kind, names) => {
                args.push("install".to_string());
                if *kind == Kind::Cask {
                    args.push("--cask".to_string());
                }
                args.extend(names.iter().cloned());
            }
        }
        args
    }
}

pub trait PackageTool: Sync {
    /// Run a lookup and return its stdout. A non-zero exit is an error.
    fn query(&self, query: Query<'_>) -> impl Future<Output = Result<String, ToolError>> + Send;

    /// Run a batched change with live output. A non-zero exit fails the whole batch.
    fn mutate(&self, mutation: Mutation<'_>)
    -> impl Future<Output = Result<(), ToolError>> + Send;
}

/// Split a line-per-name listing (`brew list`, `brew outdated --quiet`).
pub fn parse_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// The real `brew` binary.
///
/// The binary's directory is prepended to `PATH` for each child process only,
/// so brew's own helper scripts resolve without touching our environment.
#[derive(Debug, Clone)]
pub struct BrewCli {
    brew: PathBuf,
    path_env: OsString,
}

impl BrewCli {
    pub fn new(brew: impl Into<PathBuf>) -> Self {
        let brew = brew.into();
        let path_env = child_path(&brew);
        Self { brew, path_env }
    }

    pub fn path(&self) -> &Path {
        &self.brew
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.brew);
        cmd.args(args).env("PATH", &self.path_env).kill_on_drop(true);
        cmd
    }

    fn describe(args: &[String]) -> String {
        format!("brew {}", args.join(" "))
    }
}

fn child_path(brew: &Path) -> OsString {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let Some(dir) = brew.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return current;
    };

    let entries = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&current));
    std::env::join_paths(entries).unwrap_or(current)
}

impl PackageTool for BrewCli {
    async fn query(&self, query: Query<'_>) -> Result<String, ToolError> {
        let args = query.args();
        let command = Self::describe(&args);
        tracing::debug!("query: {}", command);

        let output = self
            .command(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ToolError::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(ToolError::Exit {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }

    async fn mutate(&self, mutation: Mutation<'_>) -> Result<(), ToolError> {
        let args = mutation.args();
        let command = Self::describe(&args);
        tracing::debug!("mutate: {}", command);

        let status = self
            .command(&args)
            .status()
            .await
            .map_err(|e| ToolError::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Exit {
                command,
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}
