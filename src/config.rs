//! Declarative package list.
//!
//! The config file is plain JSON with two optional lists:
//!
//! ```json
//! {
//!   "formula": ["git", "wget"],
//!   "cask": ["iterm2"]
//! }
//! ```
//!
//! A missing key means an empty list. Anything else that doesn't fit
//! (wrong type, broken JSON, unreadable file) is a fatal [`ConfigError`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Formula,
    Cask,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Formula => "formula",
            Kind::Cask => "cask",
        }
    }

    /// The `--formula` / `--cask` selector flag brew accepts on most subcommands.
    pub fn flag(self) -> &'static str {
        match self {
            Kind::Formula => "--formula",
            Kind::Cask => "--cask",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named package reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub name: String,
    pub kind: Kind,
}

impl Item {
    pub fn formula(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Formula,
        }
    }

    pub fn cask(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Cask,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub formula: Vec<String>,
    #[serde(default)]
    pub cask: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn formulae(&self) -> Vec<Item> {
        self.formula.iter().map(Item::formula).collect()
    }

    pub fn casks(&self) -> Vec<Item> {
        self.cask.iter().map(Item::cask).collect()
    }

    /// Every configured item, formulae first, in file order.
    pub fn items(&self) -> Vec<Item> {
        let mut items = self.formulae();
        items.extend(self.casks());
        items
    }
}

pub fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}
