//! Criterion benchmarks for ManifestCompiler
//!
//! Measures graph compilation and YAML encoding across graph sizes, with
//! services spread over a handful of namespaces and two clusters.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_yaml::{Mapping, Value};

use isotope_convert::{CompileParams, ManifestCompiler, Service, ServiceGraph};

// =============================================================================
// Fixtures
// =============================================================================

fn call_step(target: usize) -> Value {
    let mut step = Mapping::new();
    step.insert(Value::from("call"), Value::from(format!("svc-{target}")));
    Value::Mapping(step)
}

/// Graph where each service calls the next one and half live in another cluster
fn setup_graph(size: usize) -> ServiceGraph {
    let services = (0..size)
        .map(|i| {
            let cluster = if i % 2 == 0 { "east" } else { "west" };
            Service::new(format!("svc-{i}"), format!("ns-{}", i % 8), cluster)
                .with_replicas(2)
                .with_step(call_step((i + 1) % size))
        })
        .collect();
    ServiceGraph::new(services)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let params = CompileParams::new("east");

    for size in [10usize, 100, 500] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("manifests", size), &size, |b, &size| {
            let graph = setup_graph(size);
            let compiler = ManifestCompiler::new(&params);
            b.iter(|| black_box(compiler.compile(black_box(&graph)).unwrap()));
        });
    }

    group.finish();
}

fn bench_compile_to_yaml(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_to_yaml");
    let params = CompileParams::new("east");

    for size in [10usize, 100, 500] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("stream", size), &size, |b, &size| {
            let graph = setup_graph(size);
            let compiler = ManifestCompiler::new(&params);
            b.iter(|| black_box(compiler.compile_to_yaml(black_box(&graph)).unwrap()));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(benches, bench_compile, bench_compile_to_yaml);

criterion_main!(benches);
