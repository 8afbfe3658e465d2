//! Single-item probes.
//!
//! A probe answers one read-only question about one [`Item`]: is it
//! installed, and does it have caveats. Probes never mutate Homebrew state,
//! so running the same probe twice against unchanged state gives the same
//! [`ProbeOutcome`].

use crate::brew::{PackageTool, Query};
use crate::cask::InstalledCheck;
use crate::config::Item;
use crate::error::ProbeError;
use std::fmt;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeMode {
    Installed,
    Caveats,
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMode::Installed => f.write_str("installed"),
            ProbeMode::Caveats => f.write_str("caveats"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Present,
    Absent,
    CaveatFound(String),
    CaveatAbsent,
    ProbeFailed(String),
}

impl ProbeOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeOutcome::ProbeFailed(_))
    }
}

pub trait Probe: Sync {
    fn probe(
        &self,
        item: &Item,
        mode: ProbeMode,
    ) -> impl Future<Output = Result<ProbeOutcome, ProbeError>> + Send;
}

/// Probes backed by a [`PackageTool`].
pub struct Prober<'a, T> {
    tool: &'a T,
    installed: InstalledCheck,
}

impl<'a, T: PackageTool> Prober<'a, T> {
    pub fn new(tool: &'a T) -> Self {
        Self::with_check(tool, InstalledCheck::default())
    }

    pub fn with_check(tool: &'a T, installed: InstalledCheck) -> Self {
        Self { tool, installed }
    }

    async fn caveats(&self, item: &Item) -> Result<ProbeOutcome, ProbeError> {
        let stdout = self.tool.query(Query::Caveats(item)).await?;
        let caveat = stdout.trim();
        if caveat.is_empty() {
            Ok(ProbeOutcome::CaveatAbsent)
        } else {
            Ok(ProbeOutcome::CaveatFound(caveat.to_string()))
        }
    }
}

impl<T: PackageTool> Probe for Prober<'_, T> {
    async fn probe(&self, item: &Item, mode: ProbeMode) -> Result<ProbeOutcome, ProbeError> {
        match mode {
            ProbeMode::Installed => {
                if self.installed.is_installed(self.tool, item).await? {
                    Ok(ProbeOutcome::Present)
                } else {
                    Ok(ProbeOutcome::Absent)
                }
            }
            ProbeMode::Caveats => self.caveats(item).await,
        }
    }
}
