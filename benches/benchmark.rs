use bevy::math::{Vec2, Vec3};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stride::camera::{CameraShake, OrbitCamera};
use stride::player::{facing_towards, move_target, velocity_towards};
use stride::settings::{CameraSettings, Settings};

/// Deterministic LCG in [-1, 1] so runs are comparable.
fn next_unit(state: &mut u32) -> f32 {
    *state = state.wrapping_mul(1664525).wrapping_add(1013904223);
    ((*state >> 16) & 0x7fff) as f32 / 32767.0 * 2.0 - 1.0
}

/// Small mouse deltas, mostly inside the pitch range
fn bench_orbit_look(c: &mut Criterion) {
    let settings = Settings::default();
    c.bench_function("orbit_look", |b| {
        b.iter(|| {
            let mut orbit = OrbitCamera::default();
            for i in 0..1_000usize {
                let dx = ((i * 13) % 17) as f32 * 0.1;
                let dy = ((i * 7) % 23) as f32 * 0.2 - 5.0;
                orbit.apply_delta(black_box(Vec2::new(dx, dy)), &settings);
            }
            black_box((orbit.yaw, orbit.pitch));
        })
    });
}

/// Extreme alternating deltas that hit the pitch clamp every call
fn bench_orbit_look_extreme(c: &mut Criterion) {
    let settings = Settings::default();
    c.bench_function("orbit_look_extreme", |b| {
        b.iter(|| {
            let mut orbit = OrbitCamera::default();
            for i in 0..1_000usize {
                let d = if (i & 1) == 0 { 1000.0 } else { -1000.0 };
                orbit.apply_delta(black_box(Vec2::new(d, -d)), &settings);
            }
            black_box((orbit.yaw, orbit.pitch));
        })
    });
}

/// One movement tick's math: target, facing and velocity for random input and camera yaw
fn bench_locomotion_step(c: &mut Criterion) {
    c.bench_function("locomotion_step", |b| {
        b.iter(|| {
            let mut state: u32 = 0x1234_5678;
            let mut position = Vec3::ZERO;
            let mut velocity = Vec3::ZERO;
            for _ in 0..1_000usize {
                let input = Vec2::new(next_unit(&mut state), next_unit(&mut state));
                let yaw = next_unit(&mut state) * std::f32::consts::PI;
                let forward = Vec3::new(-yaw.sin(), -0.3, -yaw.cos());
                let right = Vec3::new(yaw.cos(), 0.0, -yaw.sin());
                let target = move_target(position, forward, right, black_box(input), 10.0, 0.02);
                black_box(facing_towards(position, target));
                velocity = velocity_towards(velocity, position, target, 0.02);
                position = target;
            }
            black_box((position, velocity));
        })
    });
}

/// Sampling the shake noise at full trauma over ten seconds of frames
fn bench_shake_sample(c: &mut Criterion) {
    let settings = CameraSettings::default();
    c.bench_function("shake_sample", |b| {
        b.iter(|| {
            let mut shake = CameraShake::new(7, &settings);
            shake.decay = 0.0;
            shake.add_trauma(1.0);
            let mut acc = (Vec3::ZERO, 0.0_f32);
            for _ in 0..600usize {
                shake.advance(1.0 / 60.0);
                let (offset, roll) = shake.sample();
                acc.0 += offset;
                acc.1 += roll;
            }
            black_box(acc);
        })
    });
}

criterion_group!(
    benches,
    bench_orbit_look,
    bench_orbit_look_extreme,
    bench_locomotion_step,
    bench_shake_sample
);
criterion_main!(benches);
