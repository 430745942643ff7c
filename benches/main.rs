use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::path::Path;
use std::time::Duration;
use swb_status_line::format;
use swb_status_line::sources::FixedSource;
use swb_status_line::stats::{LoadAverage, parse_meminfo, read_meminfo};
use swb_status_line::{
    Aggregator, FailurePolicy, MetricSample, Reading, SourceGroup, SourceKind, SourceRegistry,
    StatusLine,
};
use tokio::runtime::Runtime;

const MEMINFO: &str = "MemTotal:       16314436 kB
MemFree:         3351296 kB
MemAvailable:   11209384 kB
Buffers:          689516 kB
Cached:          7030676 kB
SwapCached:         1024 kB
SwapTotal:       8388604 kB
SwapFree:        8123388 kB
";

fn create_test_registry() -> SourceRegistry {
    SourceRegistry::new(vec![
        SourceGroup::single(Box::new(FixedSource::new(
            SourceKind::Media,
            MetricSample::text("Artist - A rather long track title that needs truncating soon"),
        ))),
        SourceGroup::new(vec![
            Box::new(
                FixedSource::new(SourceKind::Memory, MetricSample::percent(41.7))
                    .with_policy(FailurePolicy::Fatal),
            ),
            Box::new(FixedSource::new(SourceKind::Cpu, MetricSample::percent(23.0))),
        ]),
        SourceGroup::single(Box::new(FixedSource::new(
            SourceKind::Swap,
            MetricSample::Absent,
        ))),
        SourceGroup::single(Box::new(FixedSource::new(
            SourceKind::Battery,
            MetricSample::percent(87.2),
        ))),
        SourceGroup::single(Box::new(
            FixedSource::new(SourceKind::Clock, MetricSample::text("16-01-2024 00:30"))
                .with_policy(FailurePolicy::Fatal),
        )),
    ])
}

fn bench_formatting(c: &mut Criterion) {
    c.bench_function("fragment_percent", |b| {
        let reading = Reading::Percent(41.7);
        b.iter(|| {
            let fragment = format::fragment(black_box(SourceKind::Memory), black_box(&reading));
            black_box(fragment);
        })
    });

    c.bench_function("fragment_media_truncated", |b| {
        let reading = Reading::Text("很长的曲目名称".repeat(20));
        b.iter(|| {
            let fragment = format::fragment(black_box(SourceKind::Media), black_box(&reading));
            black_box(fragment);
        })
    });

    c.bench_function("load_average_format", |b| {
        let load = LoadAverage {
            one: 0.52,
            five: 1.1,
            fifteen: 2.25,
        };
        b.iter(|| black_box(format::load_average(black_box(&load))))
    });
}

fn bench_status_line(c: &mut Criterion) {
    let mut line = StatusLine::with_capacity(5);
    line.push("A - T".to_string());
    line.push("ram: 42% • cpu: 23%".to_string());
    line.push("bat: 87%".to_string());
    line.push("16-01-2024 00:30".to_string());

    c.bench_function("status_line_render", |b| {
        b.iter(|| black_box(black_box(&line).render()))
    });
}

fn bench_aggregation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut aggregator = Aggregator::new(create_test_registry(), Duration::from_secs(1));

    c.bench_function("aggregate_one_round", |b| {
        b.iter(|| {
            rt.block_on(async {
                let line = aggregator.collect().await;
                let _ = black_box(line);
            })
        })
    });
}

fn bench_meminfo(c: &mut Criterion) {
    c.bench_function("parse_meminfo", |b| {
        b.iter(|| black_box(parse_meminfo(black_box(MEMINFO))))
    });

    let rt = Runtime::new().unwrap();
    c.bench_function("read_host_meminfo", |b| {
        b.iter(|| {
            rt.block_on(async {
                let info = read_meminfo(Path::new("/proc/meminfo")).await;
                let _ = black_box(info);
            })
        })
    });
}

criterion_group!(
    benches,
    bench_formatting,
    bench_status_line,
    bench_aggregation,
    bench_meminfo
);
criterion_main!(benches);
