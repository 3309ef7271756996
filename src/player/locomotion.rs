//! Camera-relative movement math.
//!
//! Pure functions shared by the per-frame facing system, the per-tick
//! physics move and the benchmarks.

use bevy::prelude::*;

/// Offsets shorter than this produce no facing change.
const MIN_FACING_DISTANCE: f32 = 1e-6;

/// Project a camera's forward/right vectors onto the horizontal plane.
///
/// Vectors that are vertical (or zero) flatten to zero instead of NaN.
#[must_use]
pub fn flatten_basis(forward: Vec3, right: Vec3) -> (Vec3, Vec3) {
    let flat = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
    (flat(forward), flat(right))
}

/// World-space point the character should reach this step.
///
/// `input.x` steers along the camera's right vector, `input.y` along its
/// forward vector; the step length is `speed * dt` for a unit input.
#[must_use]
pub fn move_target(
    position: Vec3,
    camera_forward: Vec3,
    camera_right: Vec3,
    input: Vec2,
    speed: f32,
    dt: f32,
) -> Vec3 {
    let (forward, right) = flatten_basis(camera_forward, camera_right);
    let direction = right * input.x + forward * input.y;
    position + direction * speed * dt
}

/// Rotation that makes a character at `position` face `target` (-Z forward,
/// Y up). `None` when the two points coincide.
#[must_use]
pub fn facing_towards(position: Vec3, target: Vec3) -> Option<Quat> {
    let offset = target - position;
    if offset.length_squared() < MIN_FACING_DISTANCE * MIN_FACING_DISTANCE {
        return None;
    }
    // A vertical offset has no meaningful yaw; fall back to a Z-up frame so
    // `looking_to` never receives parallel vectors.
    let up = if offset.cross(Vec3::Y).length_squared() < f32::EPSILON { Vec3::Z } else { Vec3::Y };
    Some(Transform::IDENTITY.looking_to(offset, up).rotation)
}

/// Locomotion speed for this tick.
#[must_use]
pub fn movement_speed(base: f32, boost: f32, running: bool) -> f32 {
    if running { base * boost } else { base }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn flatten_drops_pitch() {
        let pitched = Vec3::new(0.0, -0.6, -0.8);
        let (f, r) = flatten_basis(pitched, Vec3::X);
        assert!(approx(f, Vec3::NEG_Z));
        assert!(approx(r, Vec3::X));
    }

    #[test]
    fn flatten_vertical_forward_is_zero() {
        let (f, _) = flatten_basis(Vec3::NEG_Y, Vec3::X);
        assert_eq!(f, Vec3::ZERO);
    }

    #[test]
    fn target_moves_along_camera_basis() {
        let start = Vec3::new(1.0, 2.0, 3.0);
        // Camera looking down -Z, tilted down.
        let fwd = Vec3::new(0.0, -0.5, -1.0);
        let target = move_target(start, fwd, Vec3::X, Vec2::new(0.0, 1.0), 10.0, 0.02);
        assert!(approx(target, Vec3::new(1.0, 2.0, 2.8)));

        let strafe = move_target(start, fwd, Vec3::X, Vec2::new(-1.0, 0.0), 10.0, 0.02);
        assert!(approx(strafe, Vec3::new(0.8, 2.0, 3.0)));
    }

    #[test]
    fn target_keeps_height() {
        let t = move_target(Vec3::Y * 5.0, Vec3::new(0.3, 0.9, 0.1), Vec3::Z, Vec2::ONE, 30.0, 0.1);
        assert!((t.y - 5.0).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_stays_put() {
        let p = Vec3::new(4.0, 0.0, -2.0);
        assert_eq!(move_target(p, Vec3::NEG_Z, Vec3::X, Vec2::Y, 10.0, 0.0), p);
    }

    #[test]
    fn facing_points_forward_at_target() {
        let rot = facing_towards(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(approx(rot * Vec3::NEG_Z, Vec3::X));
        assert!(approx(rot * Vec3::Y, Vec3::Y));
    }

    #[test]
    fn facing_same_point_is_none() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert!(facing_towards(p, p).is_none());
    }

    #[test]
    fn facing_straight_up_is_finite() {
        let rot = facing_towards(Vec3::ZERO, Vec3::Y).unwrap();
        assert!(rot.is_finite());
    }

    #[test]
    fn running_multiplies_speed() {
        assert_eq!(movement_speed(10.0, 3.0, false), 10.0);
        assert_eq!(movement_speed(10.0, 3.0, true), 30.0);
    }
}
