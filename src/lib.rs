//! Library interface for brew-sync
//!
//! Keeps a Mac's Homebrew formulae and casks in line with a JSON list. The
//! reusable part is the batch probing in [`batch`]: bounded-parallel,
//! read-only checks whose per-item failures never take down the batch.

pub mod batch;
pub mod brew;
pub mod cask;
pub mod caveats;
pub mod colors;
pub mod commands;
pub mod config;
pub mod error;
pub mod platform;
pub mod probe;
pub mod report;

// Re-export commonly used types
pub use batch::{BatchResult, BatchRunner, MAX_WORKERS, ProbeJob, ProbeRecord};
pub use brew::{BrewCli, Mutation, PackageTool, Query};
pub use config::{Config, Item, Kind};
pub use error::{ConfigError, ProbeError, SyncError, ToolError};
pub use probe::{Probe, ProbeMode, ProbeOutcome, Prober};
pub use report::{CaveatEntry, Report, ReportBuilder, Step};
