use criterion::{black_box, criterion_group, criterion_main, Criterion};
use smoother_core::bank::{BankConfig, FrameInput, SmootherBank};
use smoother_core::types::{Pose, PoseSample, TargetId, TrackerEvent, TrackerEventKind, Vec3};
use smoother_core::{PoseSmoother, SmootherConfig};

const DT: f64 = 1.0 / 60.0;

fn jittered(i: usize) -> Pose {
    let k = i as f64;
    Pose::new(
        Vec3::new(0.2 * (k * 0.05).sin() + 0.005 * (k * 7.1).sin(), 0.0, -1.0),
        Vec3::new(0.0, 0.1 * (k * 0.03).cos(), 0.0),
        Vec3::repeat(1.0),
    )
}

fn bench_single(c: &mut Criterion) {
    c.bench_function("smoother_1000_frames", |b| {
        b.iter(|| {
            let mut s = PoseSmoother::new(SmootherConfig::default());
            s.on_target_found();
            for i in 0..1000 {
                black_box(s.ingest(jittered(i), i as f64 * DT));
            }
        });
    });
}

fn bench_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("bank");

    for n in [3, 30, 300] {
        group.bench_function(format!("{n}_targets"), |b| {
            b.iter(|| {
                let mut bank = SmootherBank::new(BankConfig::default());
                let ids: Vec<TargetId> = (0..n).map(|_| bank.add_target()).collect();
                let events = ids
                    .iter()
                    .map(|&target| TrackerEvent {
                        target,
                        time: 0.0,
                        kind: TrackerEventKind::Found,
                    })
                    .collect();
                bank.process_frame(&FrameInput {
                    time: 0.0,
                    events,
                    samples: vec![],
                });
                // Measure steady-state frames
                for f in 1..120 {
                    let time = f as f64 * DT;
                    let samples = ids
                        .iter()
                        .map(|&target| PoseSample {
                            target,
                            time,
                            pose: jittered(f + target.0 as usize),
                        })
                        .collect();
                    black_box(bank.process_frame(&FrameInput {
                        time,
                        events: vec![],
                        samples,
                    }));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single, bench_bank);
criterion_main!(benches);
