//! Benchmarks for construction, operators, canonicalization and weld.

use criterion::{criterion_group, criterion_main, Criterion};
use conway::algo::canonicalize::{canonicalize, CanonicalizeOptions};
use conway::algo::chain::{apply_chain, OpKind, OpStep};
use conway::algo::conway::{ambo, dual, kis, truncate, KisOptions};
use conway::algo::weld::weld;
use conway::prelude::*;
use conway::tiling::{make_grid, unitile, GridShape, UnitileOptions, UnitilePattern};

fn bench_construction(c: &mut Criterion) {
    let flat = make_grid(30, 30, 1.0, 1.0).unwrap().to_flat();

    c.bench_function("from_flat_grid_30x30", |b| {
        b.iter(|| ConwayPoly::from_flat(&flat).unwrap());
    });

    c.bench_function("unitile_3464_torus", |b| {
        let options = UnitileOptions::new(UnitilePattern::Rhombitrihexagonal3464, GridShape::Torus)
            .with_size(12, 12)
            .with_weld(true);
        b.iter(|| unitile(&options).unwrap());
    });
}

fn bench_operators(c: &mut Criterion) {
    let dodeca = shapes::dodecahedron();
    let big = ambo(&kis(&dodeca, &KisOptions::new(0.1), &mut Jitter::none()).unwrap()).unwrap();

    c.bench_function("dual", |b| {
        b.iter(|| dual(&big).unwrap());
    });

    c.bench_function("truncate", |b| {
        b.iter(|| truncate(&big, 0.3, Selector::All, &mut Jitter::none()).unwrap());
    });

    c.bench_function("chain_ambo_dual_kis_truncate", |b| {
        let steps = [
            OpStep::new(OpKind::Ambo),
            OpStep::new(OpKind::Dual),
            OpStep::new(OpKind::Kis).with_amount(0.1),
            OpStep::new(OpKind::Truncate).with_amount(0.25),
        ];
        b.iter(|| apply_chain(&dodeca, &steps, None, &Progress::none()).unwrap());
    });
}

fn bench_canonicalize(c: &mut Criterion) {
    let poly = truncate(&shapes::icosahedron(), 0.3, Selector::All, &mut Jitter::none()).unwrap();

    c.bench_function("canonicalize_sequential", |b| {
        let options = CanonicalizeOptions::iterations(50, 50).sequential();
        b.iter(|| canonicalize(&poly, &options).unwrap());
    });

    c.bench_function("canonicalize_parallel", |b| {
        let options = CanonicalizeOptions::iterations(50, 50).with_parallel(true);
        b.iter(|| canonicalize(&poly, &options).unwrap());
    });
}

fn bench_weld(c: &mut Criterion) {
    let options = UnitileOptions::new(UnitilePattern::Square4444, GridShape::Torus).with_size(30, 30);
    let open = unitile(&options).unwrap();

    c.bench_function("weld_torus_30x30", |b| {
        b.iter(|| weld(&open, 0.001).unwrap());
    });
}

criterion_group!(benches, bench_construction, bench_operators, bench_canonicalize, bench_weld);
criterion_main!(benches);
