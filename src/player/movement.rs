//! Per-frame facing and per-tick locomotion.
//!
//! `face_move_target` runs every render frame and turns the character toward
//! where it is heading. `movement_tick` runs once per physics tick and reads
//! jump, run and move independently, in that order, updating animator flags
//! and the rigid body's velocity.

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::animation::AnimatorFlags;
use crate::camera::{ImpulseSource, OrbitCamera, ShakeImpulse};
use crate::input::PlayerActions;
use crate::player::jump::{resolve_jump, JumpOutcome};
use crate::player::locomotion::{facing_towards, move_target, movement_speed};
use crate::player::{MovementBridge, Player};
use crate::settings::{MovementSettings, Settings, ShakeTrigger};

/// Rotate the character to face its camera-relative move target.
///
/// Uses the frame delta, so the target is a short step ahead; only its
/// direction matters.
#[allow(clippy::needless_pass_by_value)]
pub fn face_move_target(
    time: Res<Time>,
    actions: Res<PlayerActions>,
    camera: Query<&GlobalTransform, With<OrbitCamera>>,
    mut players: Query<(&Position, &mut Rotation, &MovementBridge), With<Player>>,
) {
    if !actions.move_pressed() {
        return;
    }
    let Ok(camera) = camera.get_single() else { return };
    let input = actions.move_value();

    for (position, mut rotation, bridge) in &mut players {
        let target = move_target(
            position.0,
            *camera.forward(),
            *camera.right(),
            input,
            bridge.speed,
            time.delta_seconds(),
        );
        if let Some(facing) = facing_towards(position.0, target) {
            rotation.0 = facing;
        }
    }
}

/// Whether this tick's run input should fire a shake impulse.
#[must_use]
pub fn run_fires_impulse(trigger: ShakeTrigger, run_held_last_tick: bool) -> bool {
    match trigger {
        ShakeTrigger::EveryTick => true,
        ShakeTrigger::OnPress => !run_held_last_tick,
    }
}

/// Horizontal velocity that covers `target - position` in exactly `dt`.
///
/// Vertical velocity is left to gravity and jump impulses.
#[must_use]
pub fn velocity_towards(current: Vec3, position: Vec3, target: Vec3, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return Vec3::new(0.0, current.y, 0.0);
    }
    let step = (target - position) / dt;
    Vec3::new(step.x, current.y, step.z)
}

/// One physics tick of the movement bridge.
#[allow(clippy::needless_pass_by_value)]
pub fn movement_tick(
    time: Res<Time>,
    actions: Res<PlayerActions>,
    settings: Res<Settings>,
    camera: Query<&GlobalTransform, With<OrbitCamera>>,
    mut players: Query<
        (
            &Position,
            &mut LinearVelocity,
            &mut MovementBridge,
            &mut AnimatorFlags,
            Option<&mut ImpulseSource>,
        ),
        With<Player>,
    >,
    mut shakes: EventWriter<ShakeImpulse>,
) {
    let MovementSettings { base_speed, boost_multiplier, shake_trigger, .. } = settings.movement;
    let shake_strength = settings.camera.shake_strength;
    let dt = time.delta_seconds();
    let camera = camera.get_single().ok();

    for (position, mut velocity, mut bridge, mut flags, source) in &mut players {
        if actions.jump_pressed() {
            let outcome = resolve_jump(&mut flags, &mut bridge.can_double_jump);
            if outcome == JumpOutcome::DoubleJump {
                debug!("double jump");
            }
        }

        let running = actions.run_pressed();
        flags.running = running;
        if let Some(mut source) = source {
            if source.strength != shake_strength {
                source.strength = shake_strength;
            }
            if running && run_fires_impulse(shake_trigger, bridge.run_held) {
                source.generate_impulse(&mut shakes);
            }
        }
        bridge.run_held = running;
        bridge.speed = movement_speed(base_speed, boost_multiplier, running);

        flags.walking = actions.move_pressed();
        match camera {
            Some(camera) if flags.walking => {
                let target = move_target(
                    position.0,
                    *camera.forward(),
                    *camera.right(),
                    actions.move_value(),
                    bridge.speed,
                    dt,
                );
                velocity.0 = velocity_towards(velocity.0, position.0, target, dt);
            }
            _ => {
                velocity.0 = Vec3::new(0.0, velocity.y, 0.0);
            }
        }
    }
}
