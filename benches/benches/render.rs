//! Benchmark template compilation and rendering time.

use std::io;

use criterion::{criterion_group, criterion_main, Criterion};

use benches::context;

criterion_main! { benches }
criterion_group! { benches, bench_compile, bench_load, bench_render }

/// Benchmarks the time taken to compile a template and its dependencies.
fn bench_compile(c: &mut Criterion) {
    let mut g = c.benchmark_group("compile");
    let source = benches::repeat(benches::PAGE, 50);

    g.bench_function("raw", |b| {
        b.iter(|| benches::compile(&source, benches::dependencies()));
    });

    let text = benches::portable_dependencies();
    g.bench_function("portable", |b| {
        b.iter(|| benches::compile(&source, text.clone()));
    });
}

/// Benchmarks the time taken to decode a portable unit.
fn bench_load(c: &mut Criterion) {
    let source = benches::repeat(benches::PAGE, 50);
    let text = benches::compile(&source, benches::dependencies())
        .to_portable()
        .to_text();
    c.bench_function("load", |b| {
        b.iter(|| benches::load(&text));
    });
}

/// Benchmarks the time taken to render a template.
fn bench_render(c: &mut Criterion) {
    let mut g = c.benchmark_group("render");

    let source = benches::repeat(benches::PAGE, 20);
    let renderer = benches::compile(&source, benches::dependencies());
    let ctx = forma::to_value(context::random(150)).unwrap();

    g.bench_function("string", |b| {
        b.iter(|| renderer.render_from(&ctx).unwrap());
    });

    g.bench_function("writer", |b| {
        b.iter(|| {
            renderer
                .render_to_writer(io::sink(), &ctx, &forma::Value::None)
                .unwrap()
        });
    });
}
