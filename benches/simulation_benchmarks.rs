//! Tick throughput benchmarks.
//!
//! Measures the cost of one engine tick for the free pendulum (single step)
//! and the controlled pendulum (five sub-steps with control evaluation),
//! for both integrators.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pendulum_sim::prelude::*;

const DT: f64 = 1.0 / 60.0;

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");
    group.sample_size(100);
    group.confidence_level(0.95);

    for preset in [Preset::Simple, Preset::SwingUp] {
        for integrator in [IntegratorType::SymplecticEuler, IntegratorType::Rk4] {
            let config = SimConfig::builder()
                .params(preset.params())
                .integrator(integrator)
                .build();
            let id = format!("{}/{integrator:?}", preset.name());

            group.bench_function(BenchmarkId::from_parameter(id), |b| {
                let Ok(mut engine) = Engine::from_config(&config) else {
                    return;
                };
                b.iter(|| {
                    if engine.tick(black_box(DT)).is_err() {
                        engine.reset();
                    }
                    black_box(engine.state().theta)
                });
            });
        }
    }

    group.finish();
}

fn bench_ten_second_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("ten_second_run");
    group.sample_size(50);

    group.bench_function("swing_up_600_ticks", |b| {
        b.iter(|| {
            let Ok(mut engine) = Engine::new(Preset::SwingUp.params(), RunState::Running) else {
                return 0.0;
            };
            for _ in 0..600 {
                if engine.tick(DT).is_err() {
                    break;
                }
            }
            black_box(engine.snapshot().energy)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tick, bench_ten_second_run);
criterion_main!(benches);
