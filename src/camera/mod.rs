//! Follow camera and mouse look.
//!
//! `camera_look` accumulates mouse motion into an [`OrbitCamera`]'s yaw and
//! pitch, `follow_player` places the camera behind the player looking at its
//! pivot, and the [`shake`] systems perturb the result.

pub mod shake;

use bevy::input::mouse::MouseMotion;
use bevy::math::EulerRot;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

pub use shake::*;

use crate::player::Player;
use crate::settings::Settings;

// Negative pitch puts the camera above the player looking down.
pub const CAMERA_MIN_PITCH_DEG: f32 = -70.0;
pub const CAMERA_MAX_PITCH_DEG: f32 = 20.0;

/// Orbit angles of the follow camera, in radians.
#[derive(Component, Debug, Clone, Copy)]
pub struct OrbitCamera {
    /// Rotation around the world Y axis.
    pub yaw: f32,
    /// Rotation around the camera's X axis, clamped to the pitch range.
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self { yaw: 0.0, pitch: -0.35 }
    }
}

impl OrbitCamera {
    /// Apply a raw mouse delta (updates yaw/pitch and clamps pitch).
    pub fn apply_delta(&mut self, delta: Vec2, settings: &Settings) {
        let scale = settings.controls.mouse_sensitivity / 10000.0;
        self.yaw -= delta.x * scale;
        self.pitch = (self.pitch - delta.y * scale)
            .clamp(CAMERA_MIN_PITCH_DEG.to_radians(), CAMERA_MAX_PITCH_DEG.to_radians());
    }

    /// Camera transform orbiting `pivot` at `distance`, looking at it.
    #[must_use]
    pub fn rig_transform(&self, pivot: Vec3, distance: f32) -> Transform {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);
        let eye = pivot + rotation * Vec3::new(0.0, 0.0, distance);
        Transform::from_translation(eye).looking_at(pivot, Vec3::Y)
    }
}

/// Turn mouse motion into orbit angles while the cursor is captured.
#[allow(clippy::needless_pass_by_value)]
pub fn camera_look(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut motion: EventReader<MouseMotion>,
    settings: Res<Settings>,
    mut cameras: Query<&mut OrbitCamera>,
) {
    let mut delta = Vec2::ZERO;
    for ev in motion.read() {
        let mut axis = ev.delta;
        if settings.controls.invert_x {
            axis.x = -axis.x;
        }
        if settings.controls.invert_y {
            axis.y = -axis.y;
        }
        delta += axis;
    }
    if delta == Vec2::ZERO {
        return;
    }

    let Ok(window) = windows.get_single() else { return };
    if window.cursor.visible {
        return;
    }

    for mut orbit in &mut cameras {
        orbit.apply_delta(delta, &settings);
    }
}

/// Place every orbit camera behind the player.
#[allow(clippy::needless_pass_by_value)]
pub fn follow_player(
    settings: Res<Settings>,
    players: Query<&Transform, With<Player>>,
    mut cameras: Query<(&mut Transform, &OrbitCamera), Without<Player>>,
) {
    let Ok(player) = players.get_single() else { return };
    let pivot = player.translation + Vec3::Y * settings.camera.height;
    for (mut transform, orbit) in &mut cameras {
        *transform = orbit.rig_transform(pivot, settings.camera.distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped() {
        let settings = Settings::default();
        let mut orbit = OrbitCamera::default();
        orbit.apply_delta(Vec2::new(0.0, -1.0e6), &settings);
        assert!((orbit.pitch - CAMERA_MAX_PITCH_DEG.to_radians()).abs() < 1e-5);
        orbit.apply_delta(Vec2::new(0.0, 1.0e6), &settings);
        assert!((orbit.pitch - CAMERA_MIN_PITCH_DEG.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn yaw_follows_horizontal_motion() {
        let settings = Settings::default();
        let mut orbit = OrbitCamera::default();
        orbit.apply_delta(Vec2::new(100.0, 0.0), &settings);
        assert!(orbit.yaw < 0.0);
    }

    #[test]
    fn rig_sits_behind_and_above_looking_at_pivot() {
        let orbit = OrbitCamera::default();
        let pivot = Vec3::new(2.0, 1.0, -3.0);
        let rig = orbit.rig_transform(pivot, 6.0);
        assert!((rig.translation.distance(pivot) - 6.0).abs() < 1e-4);
        assert!(rig.translation.y > pivot.y);
        assert!(rig.translation.z > pivot.z);
        let to_pivot = (pivot - rig.translation).normalize();
        assert!((*rig.forward() - to_pivot).length() < 1e-4);
    }
}
