//! Benchmarks for the CPU-side grid cell math.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use murmuration::{GridSpec, UVec3, Vec3, WallParam};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn bench_cell_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_math");

    let wall = WallParam::default();
    let spec = GridSpec::default();
    let mut rng = SmallRng::seed_from_u64(17);
    let positions: Vec<Vec3> = (0..16_384)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-20.0..20.0),
            )
        })
        .collect();

    group.bench_function("cell_index_16k", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for &p in &positions {
                acc = acc.wrapping_add(spec.cell_index(spec.cell_coord(&wall, black_box(p))));
            }
            black_box(acc)
        })
    });

    group.bench_function("scan_span", |b| {
        b.iter(|| black_box(spec.scan_span(&wall, black_box(2.0))))
    });

    let dense = GridSpec::new(UVec3::splat(32), 16);
    group.bench_function("cell_index_16k_dense_grid", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for &p in &positions {
                acc = acc.wrapping_add(dense.cell_index(dense.cell_coord(&wall, black_box(p))));
            }
            black_box(acc)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_cell_index);
criterion_main!(benches);
