//! Cycle benchmark: cost of the evaluate/commit step.
//!
//! Measures a single base-clock step, one sample evaluation through the
//! fast-forward path, and one simulated second of driving.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use vcu_common::prelude::*;
use vcu_core::cycle::Engine;

/// Engine settled in Normal mode while driving.
fn settled(band: SpeedBand) -> (Engine, Inputs) {
    let inputs = Inputs::driving(band);
    let mut engine = Engine::default();
    engine.run_samples(&inputs, 10);
    (engine, inputs)
}

fn bench_single_step(c: &mut Criterion) {
    let (engine, inputs) = settled(SpeedBand::Above25);
    c.bench_function("engine_step", |b| {
        b.iter(|| black_box(engine.step(black_box(&inputs))))
    });
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_samples");
    for band in [SpeedBand::Below3, SpeedBand::Above75] {
        let (engine, inputs) = settled(band);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{band:?}")), &band, |b, _| {
            let mut engine = engine.clone();
            b.iter(|| black_box(engine.run_samples(black_box(&inputs), 1)))
        });
    }
    group.finish();
}

fn bench_one_second(c: &mut Criterion) {
    let (engine, mut inputs) = settled(SpeedBand::Above90);
    inputs.tla = TlaChannels::POWER_BRAKE_DEMAND;
    c.bench_function("run_for_1s_with_activity", |b| {
        b.iter(|| {
            let mut engine = engine.clone();
            black_box(engine.run_for(&inputs, SAMPLE_TIME * 2_000))
        })
    });
}

criterion_group!(benches, bench_single_step, bench_sample, bench_one_second);
criterion_main!(benches);
