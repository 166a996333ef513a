use chores_core::models::{MaterializationConfig, Periodical, RepeatCycle};
use chores_core::recurrence::{horizon_for, plan_chain, plan_extension, FixedClock, MaterializationManager};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 11, 19, 9, 0, 0).unwrap()
}

fn bench_plan_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_chain");
    let first = start();
    let until = first + Duration::days(3650);

    for horizon_months in [2u32, 12, 60] {
        let horizon = horizon_for(first.date_naive(), horizon_months);
        for cycle in [RepeatCycle::Daily, RepeatCycle::Weekly, RepeatCycle::Monthly] {
            group.bench_with_input(
                BenchmarkId::new(cycle.to_string(), horizon_months),
                &horizon,
                |b, horizon| b.iter(|| plan_chain(black_box(cycle), first, until, *horizon)),
            );
        }
    }

    group.finish();
}

fn bench_plan_extension(c: &mut Criterion) {
    let latest = start();
    let until = latest + Duration::days(3650);
    let horizon = horizon_for(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 2);

    c.bench_function("plan_extension_daily", |b| {
        b.iter(|| plan_extension(black_box(RepeatCycle::Daily), latest, until, horizon))
    });
}

fn bench_horizon(c: &mut Criterion) {
    let manager = MaterializationManager::with_clock(
        MaterializationConfig::default(),
        Arc::new(FixedClock(start())),
    );

    c.bench_function("horizon_from_clock", |b| b.iter(|| black_box(&manager).horizon()));
}

fn bench_period_buckets(c: &mut Criterion) {
    let reference = NaiveDate::from_ymd_opt(2022, 11, 19).unwrap();

    c.bench_function("periodical_buckets", |b| {
        b.iter(|| {
            for periodical in [Periodical::Daily, Periodical::Weekly, Periodical::Monthly] {
                black_box(periodical.bucket(black_box(reference)));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_plan_chain,
    bench_plan_extension,
    bench_horizon,
    bench_period_buckets
);
criterion_main!(benches);
