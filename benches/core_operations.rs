use brewsync::batch::{BatchRunner, ProbeJob};
use brewsync::config::Item;
use brewsync::error::ProbeError;
use brewsync::probe::{Probe, ProbeMode, ProbeOutcome};
use brewsync::report::{ReportBuilder, Step};
use brewsync::Kind;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

struct Instant;

impl Probe for Instant {
    async fn probe(&self, item: &Item, _: ProbeMode) -> Result<ProbeOutcome, ProbeError> {
        if item.name.len() % 2 == 0 {
            Ok(ProbeOutcome::Present)
        } else {
            Ok(ProbeOutcome::Absent)
        }
    }
}

fn jobs(count: usize) -> Vec<ProbeJob> {
    (0..count)
        .map(|i| ProbeJob::installed(Item::cask(format!("cask-{i}"))))
        .collect()
}

fn bench_batch_runner(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let runner = BatchRunner::default();

    let mut group = c.benchmark_group("batch_runner");
    for size in [0usize, 8, 64, 512] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| rt.block_on(runner.run(&Instant, black_box(jobs(size)), "bench")))
        });
    }
    group.finish();
}

fn bench_report_json(c: &mut Criterion) {
    let names: Vec<String> = (0..200).map(|i| format!("formula-{i}")).collect();

    c.bench_function("report to_json", |b| {
        b.iter(|| {
            let mut builder = ReportBuilder::new();
            builder
                .record(Step::Upgrade, &names, true)
                .record(Step::Install(Kind::Formula), &names, false)
                .record(Step::Install(Kind::Cask), &names, true);
            black_box(builder.build().to_json())
        })
    });
}

criterion_group!(benches, bench_batch_runner, bench_report_json);
criterion_main!(benches);
