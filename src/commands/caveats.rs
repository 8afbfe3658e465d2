use super::Context;
use crate::brew::PackageTool;
use crate::caveats::collect_caveats;
use crate::config::Config;
use crate::report::CaveatEntry;
use colored::Colorize;

pub async fn caveats<T: PackageTool>(ctx: &Context<'_, T>, config: &Config) -> Vec<CaveatEntry> {
    let entries = collect_caveats(&ctx.runner, &ctx.probe, &config.items()).await;

    if entries.is_empty() {
        println!("{} No caveats for configured packages", "✓".green());
        return entries;
    }

    for entry in &entries {
        println!("{} {}", "==>".blue().bold(), entry.item.to_string().bold());
        for line in entry.caveat.lines() {
            println!("  {}", line);
        }
        println!();
    }

    entries
}
