//! Caveat collection across every configured item.

use crate::batch::{BatchRunner, ProbeJob};
use crate::config::Item;
use crate::probe::{Probe, ProbeOutcome};
use crate::report::CaveatEntry;

/// Caveats for `items`, in input order. Items without caveats are dropped;
/// failed probes have already been logged by the runner and are dropped too.
pub async fn collect_caveats<P: Probe>(
    runner: &BatchRunner,
    probe: &P,
    items: &[Item],
) -> Vec<CaveatEntry> {
    let jobs = items.iter().cloned().map(ProbeJob::caveats).collect();
    let result = runner.run(probe, jobs, "Collecting caveats").await;

    result
        .into_iter()
        .filter_map(|record| match record.outcome {
            ProbeOutcome::CaveatFound(caveat) => Some(CaveatEntry {
                item: record.item,
                caveat,
            }),
            _ => None,
        })
        .collect()
}
