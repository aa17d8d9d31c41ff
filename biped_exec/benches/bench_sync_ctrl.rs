//! # Synchronisation Control Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use biped_lib::{
    gestures::{walk_table, BipedCtrl, Gesture, FORWARD, NUM_BIPED_JOINTS},
    osc::Oscillator,
    servo_ctrl::SimServo,
    sync_ctrl::{Params, SyncCtrl},
};
use util::time::SimClock;

fn sim_biped() -> BipedCtrl<SimServo, SimClock> {
    SyncCtrl::new(
        Params::with_joints(NUM_BIPED_JOINTS),
        std::array::from_fn(|_| SimServo::default()),
        SimClock::new(),
    )
    .unwrap()
}

fn sync_ctrl_benchmark(c: &mut Criterion) {
    // ---- Single oscillator ----

    let mut osc = Oscillator::new(10);
    osc.configure(30.0, 4.0, 1000, 0.5);

    c.bench_function("Oscillator::advance", |b| b.iter(|| osc.advance()));

    // ---- Full gestures on simulated servos ----

    let table = walk_table(FORWARD);

    c.bench_function("SyncCtrl::execute_gesture::walk", |b| {
        b.iter(|| {
            let mut ctrl = sim_biped();
            ctrl.execute_gesture(
                &table.amplitude_deg,
                &table.offset_deg,
                1000,
                &table.phase_rad,
                4.0,
            )
            .unwrap()
        })
    });

    c.bench_function("Gesture::perform::demo_routine", |b| {
        let routine = Gesture::demo_routine();
        b.iter(|| {
            let mut ctrl = sim_biped();
            for g in routine.iter() {
                g.perform(&mut ctrl).unwrap();
            }
        })
    });
}

criterion_group!(benches, sync_ctrl_benchmark);
criterion_main!(benches);
