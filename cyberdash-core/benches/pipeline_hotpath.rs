use cyberdash_core::{filter_refs, generate, paginate, AgentQuery, AlertRange};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_generate(c: &mut Criterion) {
    c.bench_function("roster/generate_200", |b| {
        b.iter(|| {
            let agents = generate(black_box(200), black_box(1337), AlertRange::default())
                .expect("generate roster");
            black_box(agents.len());
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let agents = generate(2_000, 1337, AlertRange::default()).expect("generate roster");
    let query = AgentQuery::text("hunt").with_scope("international");

    c.bench_function("roster/filter_paginate", |b| {
        b.iter(|| {
            let matches = filter_refs(black_box(&agents), black_box(&query));
            let page = paginate(&matches, 24, 1).expect("first page");
            black_box(page.items.len());
        });
    });
}

criterion_group!(benches, bench_generate, bench_query);
criterion_main!(benches);
