//! Criterion micro-benchmarks for Stratus CPU-bound hot paths.
//!
//! Run all:     `cargo bench`
//! Run subset:  `cargo bench -- tiling`
//! Save baseline: `cargo bench -- --save-baseline base`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use serde_json::{json, Map, Value};

use stratus::docstore::DocumentStore;
use stratus::ids::RandomIds;
use stratus::kv::KvStore;
use stratus::places::{cache_key, BoundingBox, PlaceCatalog};
use stratus::search::{SearchIndex, SearchQuery};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const US_BBOX: BoundingBox = BoundingBox {
    west: -130.0,
    south: 20.0,
    east: -60.0,
    north: 50.0,
};

const ATLANTIC_BBOX: BoundingBox = BoundingBox {
    west: -40.0,
    south: 20.0,
    east: -30.0,
    north: 30.0,
};

/// Generate realistic-ish text documents for search benchmarks.
fn generate_documents(n: usize) -> Vec<String> {
    let words = [
        "order", "invoice", "shipment", "tracking", "customer", "device", "sensor", "firmware",
        "update", "battery", "thermostat", "gateway", "payload", "message", "queue", "bucket",
        "object", "upload", "download", "region", "cluster", "marker", "polygon", "viewport",
        "latitude", "longitude", "cache", "expiry", "timeout", "retry", "service", "backend",
        "emulation", "staging", "release", "rollback", "metric", "latency", "throughput",
        "request", "response", "header", "session", "token", "profile", "account", "billing",
    ];

    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            let len = rng.gen_range(10..100);
            (0..len)
                .map(|_| words[rng.gen_range(0..words.len())])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn object_body(fields: Value) -> Map<String, Value> {
    match fields {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

// ---------------------------------------------------------------------------
// 1. Map tiling benchmarks
// ---------------------------------------------------------------------------

fn bench_tiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiling");
    let catalog = PlaceCatalog::new();

    group.bench_function("clusters_zoom5", |bench| {
        bench.iter(|| catalog.get_map_data(black_box(&US_BBOX), black_box(5)));
    });

    group.bench_function("markers_zoom8", |bench| {
        bench.iter(|| catalog.get_map_data(black_box(&US_BBOX), black_box(8)));
    });

    group.bench_function("polygons_zoom11", |bench| {
        bench.iter(|| catalog.get_map_data(black_box(&US_BBOX), black_box(11)));
    });

    group.bench_function("empty_viewport", |bench| {
        bench.iter(|| catalog.get_map_data(black_box(&ATLANTIC_BBOX), black_box(8)));
    });

    group.bench_function("cache_key", |bench| {
        bench.iter(|| cache_key(black_box(&US_BBOX), black_box(5)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Search benchmarks
// ---------------------------------------------------------------------------

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for &n_docs in &[100, 1_000, 10_000] {
        let index = SearchIndex::new(Arc::new(RandomIds));
        for doc in generate_documents(n_docs) {
            index.index("bench", object_body(json!({ "content": doc })), None);
        }

        let query = SearchQuery::Match {
            field: "content".to_string(),
            text: "firmware update".to_string(),
        };

        group.throughput(Throughput::Elements(n_docs as u64));
        group.bench_with_input(BenchmarkId::new("match", n_docs), &n_docs, |bench, _| {
            bench.iter(|| index.search(black_box("bench"), black_box(Some(&query)), None));
        });
    }

    let index = SearchIndex::new(Arc::new(RandomIds));
    group.bench_function("index_one", |bench| {
        bench.iter(|| {
            index.index(
                black_box("bench"),
                object_body(json!({ "content": "sensor firmware update rollout" })),
                Some("doc-1"),
            )
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// 3. Document store benchmarks
// ---------------------------------------------------------------------------

fn bench_docstore(c: &mut Criterion) {
    let mut group = c.benchmark_group("docstore");

    for &n_docs in &[100, 1_000, 10_000] {
        let store = DocumentStore::new(Arc::new(RandomIds));
        let mut rng = rand::thread_rng();
        for i in 0..n_docs {
            store.create(
                "users",
                object_body(json!({
                    "name": format!("user-{i}"),
                    "plan": (["free", "pro", "team"][rng.gen_range(0..3)]),
                })),
            );
        }

        let query = object_body(json!({ "plan": "pro" }));

        group.throughput(Throughput::Elements(n_docs as u64));
        group.bench_with_input(
            BenchmarkId::new("find_filtered", n_docs),
            &n_docs,
            |bench, _| {
                bench.iter(|| store.find(black_box("users"), black_box(Some(&query))));
            },
        );
    }

    let store = DocumentStore::new(Arc::new(RandomIds));
    group.bench_function("create", |bench| {
        bench.iter(|| {
            store.create(
                black_box("users"),
                object_body(json!({ "name": "bench", "plan": "pro" })),
            )
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// 4. KV store benchmarks
// ---------------------------------------------------------------------------

fn bench_kv(c: &mut Criterion) {
    let mut group = c.benchmark_group("kv");
    let store = KvStore::new();

    for i in 0..1_000 {
        store
            .set(&format!("session:{i}:profile"), &json!({ "n": i }), None)
            .unwrap();
    }

    group.bench_function("set", |bench| {
        bench.iter(|| {
            store
                .set(black_box("session:bench"), &json!({ "n": 1 }), None)
                .unwrap()
        });
    });

    group.bench_function("get", |bench| {
        bench.iter(|| store.get::<Value>(black_box("session:500:profile")));
    });

    group.bench_function("keys_glob_1k", |bench| {
        bench.iter(|| store.keys(black_box("session:*:profile")));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_tiling, bench_search, bench_docstore, bench_kv);

criterion_main!(benches);
