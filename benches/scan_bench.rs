#![deny(warnings)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use polyscan::*;
use std::{f64::consts::PI, hint::black_box, time::Duration};

/// Star polygon with `count` spikes, self-intersecting when `step > 1`
fn star(count: usize, step: usize, radius: Scalar) -> Path {
    let points = (0..count).map(|index| {
        let angle = 2.0 * PI * ((index * step) % count) as Scalar / count as Scalar;
        (
            radius + radius * angle.sin(),
            radius - radius * angle.cos(),
        )
    });
    Path::builder().polygon(points).build()
}

/// Grid of small squares, many short edges and rings
fn checkerboard(size: usize, cell: Scalar) -> Path {
    let mut builder = Path::builder();
    for row in 0..size {
        for col in 0..size {
            if (row + col) % 2 == 0 {
                builder
                    .move_to((col as Scalar * cell + 0.3, row as Scalar * cell + 0.3))
                    .rect((cell, cell));
            }
        }
    }
    builder.build()
}

fn edges_benchmark(c: &mut Criterion) {
    let path = star(501, 250, 256.0);
    let mut group = c.benchmark_group("edges");
    group.throughput(Throughput::Elements(path.points_count() as u64));
    for subsampling in [1, 16] {
        group.bench_with_input(
            BenchmarkId::new("build", subsampling),
            &subsampling,
            |b, subsampling| b.iter(|| ScanEdgeCollection::from_path(black_box(&path), *subsampling)),
        );
    }
    group.finish()
}

fn fill_benchmark(c: &mut Criterion) {
    let paths = [
        ("star", star(501, 250, 256.0)),
        ("checkerboard", checkerboard(64, 8.0)),
    ];
    for (name, path) in paths.iter() {
        let mut group = c.benchmark_group(*name);
        group.throughput(Throughput::Elements(path.points_count() as u64));
        for fill_rule in [FillRule::EvenOdd, FillRule::NonZero] {
            let options = FillOptions::default().with_fill_rule(fill_rule);
            group.bench_with_input(
                BenchmarkId::new("mask", fill_rule),
                &options,
                |b, options| b.iter_with_large_drop(|| path.mask(options)),
            );
        }
        let options = FillOptions::default().with_threads(4);
        group.bench_with_input(BenchmarkId::new("mask", "threads-4"), &options, |b, options| {
            b.iter_with_large_drop(|| path.mask(options))
        });
        group.finish()
    }
}

criterion_group!(
    name = scan;
    config = Criterion::default().sample_size(10).warm_up_time(Duration::new(1, 0));
    targets = edges_benchmark, fill_benchmark
);
criterion_main!(scan);
