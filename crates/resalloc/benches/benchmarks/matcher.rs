use criterion::{BatchSize, BenchmarkId, Criterion};
use std::hint::black_box;

use resalloc::JobId;

use crate::{cluster_description, core_jobspec, create_context};

fn bench_initialize(c: &mut Criterion) {
    for node_count in [10, 100, 1_000] {
        let description = cluster_description(node_count, 32);
        c.bench_with_input(
            BenchmarkId::new("initialize", node_count),
            &description,
            |b, description| {
                b.iter(|| {
                    let context = resalloc::Context::create();
                    context.initialize(black_box(description)).unwrap();
                    context
                });
            },
        );
    }
}

fn bench_allocate(c: &mut Criterion) {
    for node_count in [10, 100, 1_000] {
        let jobspec = core_jobspec(48);
        c.bench_with_input(
            BenchmarkId::new("allocate on half-full cluster", node_count),
            &node_count,
            |b, &node_count| {
                b.iter_batched_ref(
                    || {
                        let context = create_context(node_count, 32);
                        for job_id in 0..node_count / 2 {
                            context
                                .match_allocate(false, &core_jobspec(32), JobId::new(job_id))
                                .unwrap();
                        }
                        context
                    },
                    |context| {
                        context
                            .match_allocate(false, &jobspec, JobId::new(u64::MAX))
                            .unwrap();
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
}

fn bench_reserve(c: &mut Criterion) {
    for job_count in [10, 100, 500] {
        c.bench_with_input(
            BenchmarkId::new("reserve behind jobs", job_count),
            &job_count,
            |b, &job_count| {
                b.iter_batched_ref(
                    || {
                        let context = create_context(4, 8);
                        for job_id in 0..job_count {
                            let jobspec = format!(
                                r#"{{"version": 1, "resources": [{{"type": "core", "count": 32}}],
                                    "attributes": {{"system": {{"duration": {}}}}}}}"#,
                                10 + job_id
                            );
                            context
                                .match_allocate(true, &jobspec, JobId::new(job_id))
                                .unwrap();
                        }
                        context
                    },
                    |context| {
                        let r = context
                            .match_allocate(true, &core_jobspec(1), JobId::new(u64::MAX))
                            .unwrap();
                        assert!(r.reserved);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
}

fn bench_cancel(c: &mut Criterion) {
    for job_count in [10, 1_000] {
        c.bench_with_input(
            BenchmarkId::new("cancel a single job", job_count),
            &job_count,
            |b, &job_count| {
                b.iter_batched_ref(
                    || {
                        let context = create_context(job_count, 4);
                        for job_id in 0..job_count {
                            context
                                .match_allocate(false, &core_jobspec(4), JobId::new(job_id))
                                .unwrap();
                        }
                        context
                    },
                    |context| {
                        context.cancel(JobId::new(0), false).unwrap();
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
}

pub fn benchmark(c: &mut Criterion) {
    bench_initialize(c);
    bench_allocate(c);
    bench_reserve(c);
    bench_cancel(c);
}
