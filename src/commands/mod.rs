//! Command implementations for the brew-sync CLI
//!
//! - **sync**: update, upgrade, install what's missing, collect caveats, report
//! - **missing**: read-only listing of configured items that aren't installed
//! - **caveats**: read-only caveat collection

pub mod caveats;
pub mod missing;
pub mod sync;

pub use caveats::caveats;
pub use missing::{MissingItems, find_missing, missing};
pub use sync::{print_report, sync};

use crate::batch::BatchRunner;
use crate::brew::PackageTool;
use crate::cask::InstalledCheck;
use crate::probe::Prober;

/// Everything a command needs to talk to Homebrew.
pub struct Context<'a, T> {
    pub tool: &'a T,
    pub probe: Prober<'a, T>,
    pub runner: BatchRunner,
}

impl<'a, T: PackageTool> Context<'a, T> {
    pub fn new(tool: &'a T, runner: BatchRunner) -> Self {
        Self::with_check(tool, runner, InstalledCheck::default())
    }

    pub fn with_check(tool: &'a T, runner: BatchRunner, check: InstalledCheck) -> Self {
        Self {
            tool,
            probe: Prober::with_check(tool, check),
            runner,
        }
    }
}
