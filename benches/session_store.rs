use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};
use std::sync::Arc;
use std::time::Duration;

use portcullis::clock::SystemClock;
use portcullis::identity::{ExtendedData, USER_KEY, DEFAULT_SHARDS};
use portcullis::{AuthResult, Identity, SessionStore};

fn result_for(i: usize) -> AuthResult {
    let mut data = ExtendedData::new();
    data.insert(USER_KEY.to_string(), serde_json::json!({"id": i, "email": format!("user{}@example.com", i)}));
    AuthResult::success(Identity::from(i as u64), data)
}

fn bench_sessions(c: &mut Criterion) {
    let ns = [1_000usize, 10_000usize];
    let mut group = c.benchmark_group("session_store");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(20);

    for &n in &ns {
        let results: Vec<AuthResult> = (0..n).map(result_for).collect();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("create", n.to_string()), &n, |b, _| {
            b.iter(|| {
                let store = SessionStore::new(Duration::from_secs(3600));
                for r in &results {
                    criterion::black_box(store.create_session(r).ok());
                }
                criterion::black_box(store.len());
            });
        });

        // Build once for lookups
        let store = SessionStore::new(Duration::from_secs(3600));
        let tokens: Vec<String> = results.iter().filter_map(|r| store.create_session(r).ok()).map(|s| s.token).collect();

        group.bench_with_input(BenchmarkId::new("get_hit", n.to_string()), &n, |b, _| {
            b.iter(|| {
                let mut hits = 0usize;
                for t in &tokens {
                    if store.get_session(t).is_some() { hits += 1; }
                }
                criterion::black_box(hits);
            });
        });

        group.bench_with_input(BenchmarkId::new("get_miss", n.to_string()), &n, |b, &n| {
            let misses: Vec<String> = (0..n).map(|i| format!("missing-{}", i)).collect();
            b.iter(|| {
                let mut hits = 0usize;
                for t in &misses {
                    if store.get_session(t).is_some() { hits += 1; }
                }
                criterion::black_box(hits);
            });
        });
    }
    group.finish();
}

fn bench_shards(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_store_shards");
    group.sample_size(20);
    let results: Vec<AuthResult> = (0..4_000).map(result_for).collect();
    for shards in [1usize, 4, DEFAULT_SHARDS, 64] {
        group.bench_with_input(BenchmarkId::new("create_get", shards), &shards, |b, &shards| {
            b.iter(|| {
                let store = SessionStore::with_shards(Duration::from_secs(3600), Arc::new(SystemClock), shards);
                for r in &results {
                    if let Ok(s) = store.create_session(r) {
                        criterion::black_box(store.get_session(&s.token));
                    }
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sessions, bench_shards);
criterion_main!(benches);
