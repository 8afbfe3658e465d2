// Tests for the bounded batch runner and the two batches built on it
//
// These check the runner's contract: one outcome per job, failures stay
// local to their job, the concurrency cap holds, and results come back in
// submission order no matter how the probes finish.


use brewsync::batch::{BatchRunner, MAX_WORKERS, ProbeJob};
use brewsync::cask::{InstalledCheck, Signal, filter_missing};
use brewsync::caveats::collect_caveats;
use brewsync::config::Item;
use brewsync::error::{ProbeError, ToolError};
use brewsync::probe::{Probe, ProbeMode, ProbeOutcome, Prober};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use test_helpers::{AppDirs, MockBrew, names};

/// Probe that fails for chosen names and sleeps longer for earlier jobs.
struct Scripted {
    failing: HashSet<String>,
    hanging: HashSet<String>,
    calls: AtomicUsize,
}

impl Scripted {
    fn new() -> Self {
        Self {
            failing: HashSet::new(),
            hanging: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    fn hanging(mut self, name: &str) -> Self {
        self.hanging.insert(name.to_string());
        self
    }
}

impl Probe for Scripted {
    async fn probe(&self, item: &Item, mode: ProbeMode) -> Result<ProbeOutcome, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.hanging.contains(&item.name) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        // Earlier items finish later, so completion order is reversed.
        let rank: u64 = item.name.trim_start_matches("item").parse().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(50u64.saturating_sub(rank * 5))).await;

        if self.failing.contains(&item.name) {
            return Err(ProbeError::Tool(ToolError::Exit {
                command: format!("brew info {}", item.name),
                code: Some(1),
                stderr: String::new(),
            }));
        }

        Ok(match mode {
            ProbeMode::Installed => ProbeOutcome::Present,
            ProbeMode::Caveats => ProbeOutcome::CaveatAbsent,
        })
    }
}

fn jobs(count: usize) -> Vec<ProbeJob> {
    (1..=count)
        .map(|i| ProbeJob::installed(Item::cask(format!("item{i}"))))
        .collect()
}

#[tokio::test]
async fn test_one_outcome_per_job() {
    for count in [0, 1, 5, 8, 9, 23] {
        let probe = Scripted::new().failing("item1").failing("item9");
        let result = BatchRunner::default().run(&probe, jobs(count), "count").await;

        assert_eq!(result.len(), count, "batch of {count}");
        assert_eq!(probe.calls.load(Ordering::SeqCst), count);

        let submitted: Vec<_> = jobs(count).into_iter().map(|j| j.item).collect();
        let returned: Vec<_> = result.iter().map(|r| r.item.clone()).collect();
        assert_eq!(returned, submitted, "no duplicates, no omissions, submission order");
    }
}

#[tokio::test]
async fn test_empty_batch_returns_immediately() {
    let probe = Scripted::new();
    let result = tokio::time::timeout(
        Duration::from_secs(1),
        BatchRunner::default().run(&probe, Vec::new(), "empty"),
    )
    .await
    .expect("empty batch must not hang");

    assert!(result.is_empty());
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failure_does_not_abort_siblings() {
    let probe = Scripted::new().failing("item3");
    let result = BatchRunner::default().run(&probe, jobs(5), "isolation").await;

    assert_eq!(result.len(), 5);
    let failed: Vec<_> = result.failures().map(|r| r.item.name.as_str()).collect();
    assert_eq!(failed, ["item3"]);

    for record in result.iter().filter(|r| r.item.name != "item3") {
        assert_eq!(record.outcome, ProbeOutcome::Present);
    }
    assert!(matches!(
        &result.records()[2].outcome,
        ProbeOutcome::ProbeFailed(reason) if reason.contains("brew info item3")
    ));
}

#[tokio::test]
async fn test_timeout_becomes_failed_outcome() {
    let probe = Scripted::new().hanging("item2");
    let runner = BatchRunner::default().with_timeout(Some(Duration::from_millis(200)));
    let result = runner.run(&probe, jobs(3), "timeout").await;

    assert_eq!(result.len(), 3);
    assert_eq!(
        result.records()[1].outcome,
        ProbeOutcome::ProbeFailed("timed out after 200ms".to_string())
    );
    assert_eq!(result.records()[0].outcome, ProbeOutcome::Present);
    assert_eq!(result.records()[2].outcome, ProbeOutcome::Present);
}

#[tokio::test]
async fn test_concurrency_cap_holds() {
    let brew = MockBrew::new().delay(Duration::from_millis(20));
    let check = InstalledCheck::new(vec![Signal::Listed]);
    let prober = Prober::with_check(&brew, check);

    let jobs: Vec<_> = (0..30)
        .map(|i| ProbeJob::installed(Item::cask(format!("app{i}"))))
        .collect();
    let result = BatchRunner::default().run(&prober, jobs, "cap").await;

    assert_eq!(result.len(), 30);
    assert!(brew.max_in_flight() <= MAX_WORKERS);
    assert!(brew.max_in_flight() > 1, "probes should overlap");
}

#[tokio::test]
async fn test_custom_cap_holds() {
    let brew = MockBrew::new().delay(Duration::from_millis(10));
    let prober = Prober::with_check(&brew, InstalledCheck::new(vec![Signal::Listed]));

    let jobs: Vec<_> = (0..10)
        .map(|i| ProbeJob::installed(Item::cask(format!("app{i}"))))
        .collect();
    BatchRunner::new(3).run(&prober, jobs, "cap").await;

    assert!(brew.max_in_flight() <= 3);
}

#[tokio::test]
async fn test_each_signal_alone_marks_installed() {
    let apps = AppDirs::new();
    apps.add_app("bundled");
    let brew = MockBrew::new()
        .listed_cask("listed")
        .info_installed("described");
    let prober = Prober::with_check(&brew, apps.check());

    let casks = vec![
        Item::cask("listed"),
        Item::cask("described"),
        Item::cask("bundled"),
        Item::cask("absent"),
    ];
    let missing = filter_missing(&BatchRunner::default(), &prober, &casks).await;

    assert_eq!(missing, names(&["absent"]));
}

#[tokio::test]
async fn test_failed_check_is_assumed_missing() {
    let apps = AppDirs::new();
    let brew = MockBrew::new().failing("flaky").listed_cask("present");
    let prober = Prober::with_check(&brew, apps.check());

    let casks = vec![Item::cask("flaky"), Item::cask("present")];
    let missing = filter_missing(&BatchRunner::default(), &prober, &casks).await;

    assert_eq!(missing, names(&["flaky"]));
}

#[tokio::test]
async fn test_failure_in_listing_still_lets_other_signals_confirm() {
    let apps = AppDirs::new();
    apps.add_app("iterm2");
    let brew = MockBrew::new().fail_listing();
    let prober = Prober::with_check(&brew, apps.check());

    let missing = filter_missing(&BatchRunner::default(), &prober, &[Item::cask("iterm2")]).await;

    assert!(missing.is_empty());
}

#[tokio::test]
async fn test_filter_is_idempotent() {
    let apps = AppDirs::new();
    apps.add_app("firefox");
    let brew = MockBrew::new()
        .listed_cask("iterm2")
        .failing("flaky")
        .delay(Duration::from_millis(5));
    let prober = Prober::with_check(&brew, apps.check());
    let casks: Vec<_> = ["iterm2", "firefox", "slack", "flaky", "zoom"]
        .into_iter()
        .map(Item::cask)
        .collect();

    let runner = BatchRunner::default();
    let first = filter_missing(&runner, &prober, &casks).await;
    let second = filter_missing(&runner, &prober, &casks).await;

    assert_eq!(first, second);
    assert_eq!(first, names(&["slack", "flaky", "zoom"]));
}

#[tokio::test]
async fn test_caveats_keep_only_non_empty() {
    let brew = MockBrew::new()
        .caveat("git", "Caveat: ...")
        .caveat("docker", "  Needs a privileged helper\n")
        .failing("broken");
    let prober = Prober::new(&brew);

    let items = vec![
        Item::formula("git"),
        Item::formula("wget"),
        Item::formula("broken"),
        Item::cask("docker"),
    ];
    let entries = collect_caveats(&BatchRunner::default(), &prober, &items).await;

    let found: Vec<_> = entries
        .iter()
        .map(|e| (e.item.clone(), e.caveat.as_str()))
        .collect();
    assert_eq!(
        found,
        [
            (Item::formula("git"), "Caveat: ..."),
            (Item::cask("docker"), "Needs a privileged helper"),
        ]
    );
}
