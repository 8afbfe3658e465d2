use super::Context;
use crate::brew::{PackageTool, Query, parse_names};
use crate::cask;
use crate::config::{Config, Kind};
use colored::Colorize;
use std::collections::HashSet;

/// Configured items that still need installing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingItems {
    pub formula: Vec<String>,
    pub cask: Vec<String>,
}

impl MissingItems {
    pub fn is_empty(&self) -> bool {
        self.formula.is_empty() && self.cask.is_empty()
    }
}

/// Configured formulae absent from `brew list --formula`, in config order.
///
/// If the listing itself fails, every formula is treated as missing.
pub(crate) async fn missing_formulae<T: PackageTool>(tool: &T, names: &[String]) -> Vec<String> {
    if names.is_empty() {
        return Vec::new();
    }

    let installed: HashSet<String> = match tool.query(Query::Installed(Kind::Formula)).await {
        Ok(stdout) => parse_names(&stdout).into_iter().collect(),
        Err(e) => {
            tracing::warn!("failed to list installed formulae: {}", e);
            println!(
                "  {} Could not list installed formulae, assuming none are installed",
                "⚠".yellow()
            );
            HashSet::new()
        }
    };

    names
        .iter()
        .filter(|name| !installed.contains(*name))
        .cloned()
        .collect()
}

pub async fn find_missing<T: PackageTool>(ctx: &Context<'_, T>, config: &Config) -> MissingItems {
    let formula = missing_formulae(ctx.tool, &config.formula).await;
    let cask = cask::filter_missing(&ctx.runner, &ctx.probe, &config.casks()).await;
    MissingItems { formula, cask }
}

pub async fn missing<T: PackageTool>(ctx: &Context<'_, T>, config: &Config) -> MissingItems {
    println!("Checking configured packages...");
    let found = find_missing(ctx, config).await;

    if found.is_empty() {
        println!("{} Everything in the config is installed", "✓".green());
        return found;
    }

    for (kind, names) in [(Kind::Formula, &found.formula), (Kind::Cask, &found.cask)] {
        if names.is_empty() {
            continue;
        }
        println!(
            "{} {} {} not installed:",
            "✗".red(),
            names.len().to_string().bold(),
            kind
        );
        for name in names {
            println!("  {}", name.cyan());
        }
    }

    found
}
