//! Cask installation detection and the missing-cask filter.
//!
//! `brew list --cask` alone misses apps that were dragged into
//! `/Applications` by hand or installed under a different token, so a cask
//! counts as installed when *any* of several independent signals says so.

use crate::batch::{BatchRunner, ProbeJob};
use crate::brew::{PackageTool, Query, parse_names};
use crate::config::Item;
use crate::error::ToolError;
use crate::probe::{Probe, ProbeOutcome};
use colored::Colorize;
use std::path::PathBuf;

/// Marker `brew info` prints for a package that isn't installed.
const NOT_INSTALLED: &str = "Not installed";

/// One way of telling whether an item is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Name is a line of `brew list --<kind>`.
    Listed,
    /// `brew info` doesn't say "Not installed".
    InfoText,
    /// `<dir>/<name>.app` exists in one of these directories.
    AppBundle(Vec<PathBuf>),
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Listed => "list",
            Signal::InfoText => "info",
            Signal::AppBundle(_) => "app bundle",
        }
    }

    pub async fn check<T: PackageTool>(&self, tool: &T, item: &Item) -> Result<bool, ToolError> {
        match self {
            Signal::Listed => {
                let stdout = tool.query(Query::Installed(item.kind)).await?;
                Ok(parse_names(&stdout).iter().any(|name| *name == item.name))
            }
            Signal::InfoText => {
                let stdout = tool.query(Query::Info(item)).await?;
                Ok(!stdout.contains(NOT_INSTALLED))
            }
            Signal::AppBundle(dirs) => {
                let bundle = format!("{}.app", item.name);
                Ok(dirs.iter().any(|dir| dir.join(&bundle).exists()))
            }
        }
    }
}

/// Standard application folders: `/Applications` and `~/Applications`.
pub fn application_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/Applications")];
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(PathBuf::from(home).join("Applications"));
    }
    dirs
}

/// Ordered signals, OR-ed together with short-circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledCheck {
    signals: Vec<Signal>,
}

impl Default for InstalledCheck {
    fn default() -> Self {
        Self::new(vec![
            Signal::Listed,
            Signal::InfoText,
            Signal::AppBundle(application_dirs()),
        ])
    }
}

impl InstalledCheck {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals }
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// True as soon as one signal confirms the item.
    ///
    /// A failing signal doesn't stop the later ones. The first error is only
    /// returned if nothing confirmed the item.
    pub async fn is_installed<T: PackageTool>(
        &self,
        tool: &T,
        item: &Item,
    ) -> Result<bool, ToolError> {
        let mut first_error = None;

        for signal in &self.signals {
            match signal.check(tool, item).await {
                Ok(true) => {
                    tracing::debug!("{} confirmed installed by {} check", item, signal.name());
                    return Ok(true);
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!("{} check failed for {}: {}", signal.name(), item, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(false),
        }
    }
}

/// Names of `items` that still need installing, in input order.
///
/// A failed check counts as "not installed" so the item is still attempted;
/// brew itself will skip it if it turns out to be present.
pub async fn filter_missing<P: Probe>(
    runner: &BatchRunner,
    probe: &P,
    items: &[Item],
) -> Vec<String> {
    let jobs = items.iter().cloned().map(ProbeJob::installed).collect();
    let result = runner.run(probe, jobs, "Checking installed casks").await;

    let mut missing = Vec::new();
    for record in result {
        match record.outcome {
            ProbeOutcome::Present => {}
            ProbeOutcome::ProbeFailed(reason) => {
                println!(
                    "  {} Failed to check {}: {}, assuming not installed",
                    "⚠".yellow(),
                    record.item.name.bold(),
                    reason.dimmed()
                );
                missing.push(record.item.name);
            }
            _ => missing.push(record.item.name),
        }
    }
    missing
}
