//! Bounded concurrent batch runner.
//!
//! Fans a list of [`ProbeJob`]s out over at most `min(max_workers, jobs)`
//! concurrent probes and waits for all of them. Every submitted job comes
//! back as exactly one [`ProbeRecord`]: a probe that errors, panics, or
//! times out is turned into [`ProbeOutcome::ProbeFailed`] for that job only,
//! and its siblings keep running.
//!
//! Results are collected in completion order and handed back sorted by
//! submission order, so callers never see scheduling noise.

use crate::config::Item;
use crate::error::ProbeError;
use crate::probe::{Probe, ProbeMode, ProbeOutcome};
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

pub const MAX_WORKERS: usize = 8;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeJob {
    pub item: Item,
    pub mode: ProbeMode,
}

impl ProbeJob {
    pub fn installed(item: Item) -> Self {
        Self {
            item,
            mode: ProbeMode::Installed,
        }
    }

    pub fn caveats(item: Item) -> Self {
        Self {
            item,
            mode: ProbeMode::Caveats,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRecord {
    pub item: Item,
    pub mode: ProbeMode,
    pub outcome: ProbeOutcome,
}

/// One record per submitted job, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    records: Vec<ProbeRecord>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ProbeRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeRecord> {
        self.records.iter()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeRecord> {
        self.records.iter().filter(|r| r.outcome.is_failed())
    }
}

impl IntoIterator for BatchResult {
    type Item = ProbeRecord;
    type IntoIter = std::vec::IntoIter<ProbeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a ProbeRecord;
    type IntoIter = std::slice::Iter<'a, ProbeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[derive(Debug, Clone)]
pub struct BatchRunner {
    max_workers: usize,
    timeout: Option<Duration>,
    show_progress: bool,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(MAX_WORKERS)
    }
}

impl BatchRunner {
    /// A zero cap is bumped to one so the pool can always make progress.
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            timeout: None,
            show_progress: false,
        }
    }

    /// Give up on a single probe after `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Pool size for a batch of `jobs`: never larger than the batch itself.
    pub fn workers_for(&self, jobs: usize) -> usize {
        self.max_workers.min(jobs)
    }

    pub async fn run<P: Probe>(&self, probe: &P, jobs: Vec<ProbeJob>, label: &str) -> BatchResult {
        let workers = self.workers_for(jobs.len());
        if workers == 0 {
            return BatchResult::default();
        }

        tracing::debug!("{}: {} jobs on {} workers", label, jobs.len(), workers);
        let progress = self.progress_bar(jobs.len() as u64, label);
        let timeout = self.timeout;

        let mut records: Vec<(usize, ProbeRecord)> = stream::iter(jobs.into_iter().enumerate())
            .map(|(index, job)| async move {
                let outcome = run_one(probe, &job, timeout).await;
                (index, job, outcome)
            })
            .buffer_unordered(workers)
            .map(|(index, job, outcome)| {
                progress.inc(1);
                let record = ProbeRecord {
                    item: job.item,
                    mode: job.mode,
                    outcome,
                };
                (index, record)
            })
            .collect()
            .await;

        progress.finish_and_clear();
        records.sort_by_key(|(index, _)| *index);

        BatchResult {
            records: records.into_iter().map(|(_, record)| record).collect(),
        }
    }

    fn progress_bar(&self, len: u64, label: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{pos}/{len}]") {
            bar.set_style(style);
        }
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}

async fn run_one<P: Probe>(probe: &P, job: &ProbeJob, timeout: Option<Duration>) -> ProbeOutcome {
    let guarded = AssertUnwindSafe(probe.probe(&job.item, job.mode)).catch_unwind();

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(result) => result,
            Err(_) => Ok(Err(ProbeError::TimedOut(limit))),
        },
        None => guarded.await,
    };

    let error = match result {
        Ok(Ok(outcome)) => return outcome,
        Ok(Err(e)) => e,
        Err(payload) => ProbeError::Panicked(panic_message(payload.as_ref())),
    };

    tracing::warn!("{} probe failed for {}: {}", job.mode, job.item, error);
    ProbeOutcome::ProbeFailed(error.to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
