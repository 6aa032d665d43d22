//! Criterion benchmarks for timbre-synth components
//!
//! Run with: cargo bench -p timbre-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use timbre_synth::{
    Algorithm, Engine, ModConnection, ModSource, ModTarget, ModulationRouter, Operator,
    OperatorGraph, OperatorParams, Preset, SourceValues,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

// ============================================================================
// Operator benchmarks
// ============================================================================

fn bench_operator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Operator");

    for &block_size in BLOCK_SIZES {
        let mut op = Operator::new(SAMPLE_RATE);
        op.trigger(440.0, 100);

        group.bench_with_input(
            BenchmarkId::new("advance", block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for _ in 0..size {
                        sum += op.advance(black_box(25.0));
                    }
                    black_box(sum)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Voice rendering per topology
// ============================================================================

fn bench_topologies(c: &mut Criterion) {
    let mut group = c.benchmark_group("Engine_Topology");

    let topologies = [
        ("Serial", Algorithm::Serial),
        ("Parallel", Algorithm::Parallel),
        ("DualSerial", Algorithm::DualSerial),
        ("FanOut", Algorithm::FanOut),
        ("Split", Algorithm::Split),
    ];

    for (name, alg) in &topologies {
        let mut preset = Preset::default();
        preset.algorithm = *alg;
        let mut engine = Engine::new(SAMPLE_RATE);
        engine.load_preset(&preset);
        engine.tick(0.0);
        engine.note_on(60, 100);

        let mut block = [0.0f32; 256];
        group.bench_function(BenchmarkId::new(*name, 256), |b| {
            b.iter(|| {
                engine.process_block(&mut block);
                black_box(block[0])
            })
        });
    }

    group.finish();
}

// ============================================================================
// Full polyphony
// ============================================================================

fn bench_full_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("Engine_Polyphony");

    for &block_size in BLOCK_SIZES {
        let mut engine = Engine::new(SAMPLE_RATE);
        engine.load_preset(&Preset::default());
        engine.tick(0.0);
        for (i, note) in [48u8, 52, 55, 60, 64, 67, 72, 76].iter().enumerate() {
            engine.tick(i as f64 * 0.01);
            engine.note_on(*note, 100);
        }

        let mut block = vec![0.0f32; block_size];
        group.bench_with_input(
            BenchmarkId::new("8_voices", block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    engine.process_block(&mut block);
                    black_box(block[0])
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Graph rebuild and modulation routing
// ============================================================================

fn bench_graph_rebuild(c: &mut Criterion) {
    let params = [OperatorParams::default(); 4];
    c.bench_function("OperatorGraph/build", |b| {
        b.iter(|| {
            black_box(OperatorGraph::build(
                black_box(Algorithm::Split),
                &params,
                black_box(440.0),
            ))
        })
    });
}

fn bench_router_tick(c: &mut Criterion) {
    let mut router = ModulationRouter::new();
    for i in 0..4 {
        router.add(ModConnection::new(
            ModSource::Lfo(i),
            ModTarget::FilterCutoff,
            0.25,
        ));
        router.add(ModConnection::new(
            ModSource::Lfo(i),
            ModTarget::ReverbMix,
            -0.25,
        ));
    }
    let sources = SourceValues {
        lfo: [0.3, -0.7, 0.1, 0.9],
        env_follower: 0.5,
    };

    c.bench_function("ModulationRouter/value_x16", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            for _ in 0..16 {
                acc += router.value(black_box(ModTarget::FilterCutoff), &sources);
            }
            black_box(acc)
        })
    });
}

criterion_group!(
    benches,
    bench_operator,
    bench_topologies,
    bench_full_polyphony,
    bench_graph_rebuild,
    bench_router_tick,
);
criterion_main!(benches);
