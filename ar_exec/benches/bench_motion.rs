//! # Motion Model Benchmark
//!
//! The motion model runs once per 60 Hz cycle, so a single step has a budget
//! of well under a millisecond. This benchmark checks a step is nowhere near
//! that budget.

use criterion::{criterion_group, criterion_main, Criterion};

use ar_lib::motion::{ControlInputs, InputData, MotionCtrl, Params, SteerInput};
use util::module::State;

fn bench_params() -> Params {
    Params {
        accel_rate: 0.012,
        max_speed: 0.40,
        friction_factor: 0.95,
        brake_factor: 0.80,
        turn_rate_rad: 0.05,
        turn_deadzone: 0.01,
        steer_smoothing_factor: 0.3,
        confidence_threshold: 0.7,
        gesture_turn_gain: 0.06,
    }
}

fn motion_benchmark(c: &mut Criterion) {
    // ---- Single discrete step ----

    let discrete_input = InputData {
        controls: ControlInputs {
            forward: true,
            steer: SteerInput::Left,
            ..Default::default()
        },
    };

    c.bench_function("discrete step", |b| {
        let mut ctrl = MotionCtrl::with_params(bench_params());
        b.iter(|| ctrl.proc(&discrete_input).unwrap())
    });

    // ---- Single gesture step ----

    let gesture_input = InputData {
        controls: ControlInputs {
            forward: true,
            steer: SteerInput::Gesture {
                angle_deg: 25.0,
                confidence: 0.9,
            },
            ..Default::default()
        },
    };

    c.bench_function("gesture step", |b| {
        let mut ctrl = MotionCtrl::with_params(bench_params());
        b.iter(|| ctrl.proc(&gesture_input).unwrap())
    });

    // ---- One minute of simulated driving ----

    c.bench_function("3600 cycle drive", |b| {
        b.iter(|| {
            let mut ctrl = MotionCtrl::with_params(bench_params());
            for _ in 0..3600 {
                ctrl.proc(&discrete_input).unwrap();
            }
            ctrl
        })
    });
}

criterion_group!(benches, motion_benchmark);
criterion_main!(benches);
