//! Run summary.
//!
//! [`ReportBuilder`] collects outcomes while a sync runs; [`ReportBuilder::build`]
//! freezes them into a read-only [`Report`]. The top-level `cask` list in each
//! section is an alias of `install.cask`: it is computed from it on every read
//! and on serialization, never stored separately.

use crate::config::{Item, Kind};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Caveat text found for one configured item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaveatEntry {
    pub item: Item,
    pub caveat: String,
}

/// Serialized as `{"<kind>": "<name>", "caveat": "<text>"}`.
impl Serialize for CaveatEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.item.kind.as_str(), &self.item.name)?;
        map.serialize_entry("caveat", &self.caveat)?;
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallOutcomes {
    pub formula: Vec<String>,
    pub cask: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeOutcomes {
    pub formula: Vec<String>,
}

/// Names recorded under one of `success` / `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcomes {
    install: InstallOutcomes,
    upgrade: UpgradeOutcomes,
}

impl Outcomes {
    pub fn install(&self) -> &InstallOutcomes {
        &self.install
    }

    pub fn upgrade(&self) -> &UpgradeOutcomes {
        &self.upgrade
    }

    /// Alias of `install.cask`.
    pub fn cask(&self) -> &[String] {
        &self.install.cask
    }

    pub fn is_empty(&self) -> bool {
        self.install.formula.is_empty()
            && self.install.cask.is_empty()
            && self.upgrade.formula.is_empty()
    }

    fn bucket(&mut self, step: Step) -> &mut Vec<String> {
        match step {
            Step::Upgrade => &mut self.upgrade.formula,
            Step::Install(Kind::Formula) => &mut self.install.formula,
            Step::Install(Kind::Cask) => &mut self.install.cask,
        }
    }
}

impl Serialize for Outcomes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcomes", 3)?;
        state.serialize_field("install", &self.install)?;
        state.serialize_field("upgrade", &self.upgrade)?;
        state.serialize_field("cask", self.cask())?;
        state.end()
    }
}

/// A batched mutating step whose result is recorded as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upgrade,
    Install(Kind),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    success: Outcomes,
    error: Outcomes,
    info: Vec<CaveatEntry>,
}

impl Report {
    pub fn success(&self) -> &Outcomes {
        &self.success
    }

    pub fn error(&self) -> &Outcomes {
        &self.error
    }

    pub fn info(&self) -> &[CaveatEntry] {
        &self.info
    }

    pub fn has_errors(&self) -> bool {
        !self.error.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Append-only accumulator for a [`Report`].
#[derive(Debug, Default)]
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batched call. The whole batch lands in `success` or `error`.
    pub fn record(&mut self, step: Step, names: &[String], succeeded: bool) -> &mut Self {
        let section = if succeeded {
            &mut self.report.success
        } else {
            &mut self.report.error
        };
        section.bucket(step).extend(names.iter().cloned());
        self
    }

    pub fn caveats(&mut self, entries: impl IntoIterator<Item = CaveatEntry>) -> &mut Self {
        self.report.info.extend(entries);
        self
    }

    pub fn build(self) -> Report {
        self.report
    }
}
