//! Camera-shake impulses.
//!
//! Anything with an [`ImpulseSource`] can emit a [`ShakeImpulse`]. Cameras
//! with a [`CameraShake`] turn impulses into trauma, which decays over time
//! and drives a Perlin-noise offset and roll applied on top of the rig pose.

use bevy::prelude::*;
use noise::{NoiseFn, Perlin};

use crate::settings::{CameraSettings, Settings};

/// Emits shake impulses of a fixed strength.
#[derive(Component, Debug, Clone, Copy)]
pub struct ImpulseSource {
    pub strength: f32,
}

impl ImpulseSource {
    #[must_use]
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }

    /// Send one impulse.
    pub fn generate_impulse(&self, writer: &mut EventWriter<ShakeImpulse>) {
        writer.send(ShakeImpulse { strength: self.strength });
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShakeImpulse {
    pub strength: f32,
}

/// Trauma-based shake state of a camera.
#[derive(Component, Debug, Clone)]
pub struct CameraShake {
    /// Current trauma in [0, 1].
    pub trauma: f32,
    pub decay: f32,
    pub max_offset: f32,
    pub max_roll: f32,
    pub frequency: f32,
    elapsed: f32,
    noise: Perlin,
}

impl CameraShake {
    #[must_use]
    pub fn new(seed: u32, settings: &CameraSettings) -> Self {
        let mut shake = Self {
            trauma: 0.0,
            decay: 0.0,
            max_offset: 0.0,
            max_roll: 0.0,
            frequency: 0.0,
            elapsed: 0.0,
            noise: Perlin::new(seed),
        };
        shake.configure(settings);
        shake
    }

    /// Copy tuning from settings, keeping trauma.
    pub fn configure(&mut self, settings: &CameraSettings) {
        self.decay = settings.shake_decay;
        self.max_offset = settings.shake_max_offset;
        self.max_roll = settings.shake_max_roll_deg.to_radians();
        self.frequency = settings.shake_frequency;
    }

    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).clamp(0.0, 1.0);
    }

    /// Advance noise time and let trauma decay.
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
        self.trauma = (self.trauma - self.decay * dt).max(0.0);
    }

    /// Shake strength; quadratic in trauma so small impulses stay subtle.
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.trauma * self.trauma
    }

    /// Positional offset (camera-local) and roll for the current time.
    #[must_use]
    pub fn sample(&self) -> (Vec3, f32) {
        let k = self.intensity();
        if k == 0.0 {
            return (Vec3::ZERO, 0.0);
        }
        let t = f64::from(self.elapsed * self.frequency);
        let channel = |lane: f64| (self.noise.get([t, lane + 0.5]) as f32).clamp(-1.0, 1.0);
        let offset = Vec3::new(channel(1.0), channel(2.0), channel(3.0)) * self.max_offset * k;
        (offset, channel(4.0) * self.max_roll * k)
    }
}

/// Turn this frame's impulses into trauma on every shaking camera.
#[allow(clippy::needless_pass_by_value)]
pub fn accumulate_shake(
    time: Res<Time>,
    settings: Res<Settings>,
    mut impulses: EventReader<ShakeImpulse>,
    mut cameras: Query<&mut CameraShake>,
) {
    let added: f32 = impulses.read().map(|i| i.strength).sum();
    for mut shake in &mut cameras {
        if settings.is_changed() {
            shake.configure(&settings.camera);
        }
        shake.add_trauma(added);
        shake.advance(time.delta_seconds());
    }
}

/// Offset and roll the camera by its current shake sample.
///
/// Must run after the rig pose has been written for this frame.
pub fn apply_camera_shake(mut cameras: Query<(&mut Transform, &CameraShake)>) {
    for (mut transform, shake) in &mut cameras {
        let (offset, roll) = shake.sample();
        if roll == 0.0 && offset == Vec3::ZERO {
            continue;
        }
        let local = transform.rotation * offset;
        transform.translation += local;
        transform.rotate_local_z(roll);
    }
}
