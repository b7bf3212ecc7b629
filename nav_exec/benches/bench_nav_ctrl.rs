//! Benchmarks the navigation controller's cyclic processing.

use comms_if::tc::GoalCmd;
use criterion::{criterion_group, criterion_main, Criterion};
use nav_lib::nav_ctrl::{InputData, NavCtrl, Params};
use util::module::State;

fn bench_params() -> Params {
    Params {
        increment_m: 0.3,
        fwd_speed_ms: 0.306,
        quarter_turn_rate_rads: 1.0,
        translate_settle_s: 0.5,
        rotate_settle_s: 0.5,
        turn_then_forward: true,
    }
}

/// Runs a full goal from acceptance to completion, one rotation and 13
/// translation cycles.
fn bench_goal_consumption(c: &mut Criterion) {
    c.bench_function("NavCtrl::proc goal consumption", |b| {
        b.iter(|| {
            let mut nav_ctrl = NavCtrl::with_params(bench_params());

            let mut input = InputData {
                goal_cmd: Some(GoalCmd { x_m: 3.0, y_m: -2.0 }),
                bumps_wheeldrops: 0,
            };

            loop {
                let (_, report) = nav_ctrl.proc(&input).unwrap();

                if !report.busy {
                    break;
                }

                input = InputData::default();
            }
        })
    });
}

criterion_group!(benches, bench_goal_consumption);
criterion_main!(benches);
