//! Full sync: update → upgrade → install formulae → install casks → caveats.
//!
//! Each mutating step is a single batched `brew` call awaited on its own;
//! only the read-only probing runs in parallel. A failing step is recorded
//! in the report and the run moves on to the next one.

use super::Context;
use super::missing::missing_formulae;
use crate::brew::{Mutation, PackageTool, Query, parse_names};
use crate::cask;
use crate::caveats::collect_caveats;
use crate::config::{Config, Kind};
use crate::error::Result;
use crate::report::{Report, ReportBuilder, Step};
use colored::Colorize;

pub async fn sync<T: PackageTool>(ctx: &Context<'_, T>, config: &Config) -> Report {
    let mut report = ReportBuilder::new();

    update_and_upgrade(ctx.tool, &mut report).await;

    let formulae = missing_formulae(ctx.tool, &config.formula).await;
    install(ctx.tool, Kind::Formula, &formulae, &mut report).await;

    if !config.cask.is_empty() {
        println!("{} Checking installed casks...", "→".cyan());
    }
    let casks = cask::filter_missing(&ctx.runner, &ctx.probe, &config.casks()).await;
    install(ctx.tool, Kind::Cask, &casks, &mut report).await;

    println!("{} Collecting caveats...", "→".cyan());
    report.caveats(collect_caveats(&ctx.runner, &ctx.probe, &config.items()).await);

    report.build()
}

async fn update_and_upgrade<T: PackageTool>(tool: &T, report: &mut ReportBuilder) {
    println!("{} Updating Homebrew...", "→".cyan());
    if let Err(e) = tool.mutate(Mutation::Update).await {
        println!("  {} Update failed: {}", "⚠".yellow(), e);
    }

    println!("{} Checking for outdated formulae...", "→".cyan());
    let outdated = match tool.query(Query::Outdated(Kind::Formula)).await {
        Ok(stdout) => parse_names(&stdout),
        Err(e) => {
            println!("  {} Could not list outdated formulae: {}", "⚠".yellow(), e);
            return;
        }
    };

    if outdated.is_empty() {
        println!("  {} No formulae to upgrade", "✓".green());
        return;
    }

    println!("  Upgrading: {}", outdated.join(" ").bold());
    match tool.mutate(Mutation::Upgrade(&outdated)).await {
        Ok(()) => {
            println!("  {} Upgraded {} formulae", "✓".green(), outdated.len());
            report.record(Step::Upgrade, &outdated, true);
        }
        Err(e) => {
            println!("  {} One or more upgrades failed: {}", "✗".red(), e);
            report.record(Step::Upgrade, &outdated, false);
        }
    }
}

async fn install<T: PackageTool>(
    tool: &T,
    kind: Kind,
    names: &[String],
    report: &mut ReportBuilder,
) {
    if names.is_empty() {
        return;
    }

    println!(
        "{} Installing {}: {}",
        "→".cyan(),
        kind,
        names.join(" ").bold()
    );
    match tool.mutate(Mutation::Install(kind, names)).await {
        Ok(()) => {
            println!("  {} Installed {} {}", "✓".green(), names.len(), kind);
            report.record(Step::Install(kind), names, true);
        }
        Err(e) => {
            println!("  {} Failed to install one or more {}: {}", "✗".red(), kind, e);
            report.record(Step::Install(kind), names, false);
        }
    }
}

pub fn print_report(report: &Report) -> Result<()> {
    let json = report.to_json()?;
    println!();
    println!("{} Final result:", "==>".blue().bold());
    println!("{}", json.bold());

    if report.has_errors() {
        println!("{} Finished with errors", "⚠".yellow().bold());
    } else {
        println!("{} Done", "✓".green().bold());
    }
    Ok(())
}
