//! Jump resolution, takeoff impulse and ground contact.
//!
//! The jump input only sets animator flags. The upward push happens when a
//! [`JumpTakeoff`] arrives (sent by the animation cue), and touching anything
//! marked [`Ground`] ends the jump and gives back the double jump.

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::animation::AnimatorFlags;
use crate::player::{MovementBridge, Player};
use crate::settings::Settings;

/// Surfaces that end a jump on contact.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Ground;

/// Push the entity off the ground now.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTakeoff {
    pub entity: Entity,
}

/// What a jump press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Ignored,
    Started,
    DoubleJump,
}

/// Apply one tick of held jump input to the flags.
///
/// Airborne with the double jump available: re-trigger and spend it.
/// Grounded: start a jump. Otherwise nothing happens.
pub fn resolve_jump(flags: &mut AnimatorFlags, can_double_jump: &mut bool) -> JumpOutcome {
    if flags.jumping {
        if *can_double_jump {
            flags.trigger_jump();
            *can_double_jump = false;
            return JumpOutcome::DoubleJump;
        }
        return JumpOutcome::Ignored;
    }
    flags.trigger_jump();
    JumpOutcome::Started
}

/// Touching ground ends the jump and restores the double jump.
pub fn land(flags: &mut AnimatorFlags, can_double_jump: &mut bool) {
    flags.jumping = false;
    *can_double_jump = true;
}

/// Apply the takeoff impulse for every `JumpTakeoff` this tick.
#[allow(clippy::needless_pass_by_value)]
pub fn apply_jump_impulse(
    settings: Res<Settings>,
    mut takeoffs: EventReader<JumpTakeoff>,
    mut bodies: Query<&mut ExternalImpulse, With<Player>>,
) {
    for takeoff in takeoffs.read() {
        let Ok(mut impulse) = bodies.get_mut(takeoff.entity) else { continue };
        impulse.apply_impulse(Vec3::Y * settings.movement.jump_impulse);
    }
}

/// End jumps for players whose collider started touching `Ground`.
pub fn detect_ground_contact(
    mut started: EventReader<CollisionStarted>,
    grounds: Query<(), With<Ground>>,
    mut players: Query<(&mut AnimatorFlags, &mut MovementBridge), With<Player>>,
) {
    for CollisionStarted(a, b) in started.read() {
        for (player, other) in [(*a, *b), (*b, *a)] {
            if !grounds.contains(other) {
                continue;
            }
            let Ok((mut flags, mut bridge)) = players.get_mut(player) else { continue };
            if flags.jumping {
                debug!("player {player:?} landed");
            }
            land(&mut flags, &mut bridge.can_double_jump);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_press_starts_jump() {
        let mut f = AnimatorFlags::default();
        let mut dj = true;
        assert_eq!(resolve_jump(&mut f, &mut dj), JumpOutcome::Started);
        assert!(f.jumping);
        assert!(dj);
    }

    #[test]
    fn airborne_press_spends_double_jump_once() {
        let mut f = AnimatorFlags::default();
        let mut dj = true;
        resolve_jump(&mut f, &mut dj);
        let before = f.jump_trigger();
        assert_eq!(resolve_jump(&mut f, &mut dj), JumpOutcome::DoubleJump);
        assert!(!dj);
        assert!(f.jumping);
        assert_ne!(f.jump_trigger(), before);

        let after = f.jump_trigger();
        assert_eq!(resolve_jump(&mut f, &mut dj), JumpOutcome::Ignored);
        assert_eq!(f.jump_trigger(), after);
    }

    #[test]
    fn landing_restores_double_jump() {
        let mut f = AnimatorFlags::default();
        let mut dj = true;
        resolve_jump(&mut f, &mut dj);
        resolve_jump(&mut f, &mut dj);
        land(&mut f, &mut dj);
        assert!(!f.jumping);
        assert!(dj);
        assert_eq!(resolve_jump(&mut f, &mut dj), JumpOutcome::Started);
    }

    #[test]
    fn grounded_without_double_jump_still_jumps() {
        let mut f = AnimatorFlags::default();
        let mut dj = false;
        assert_eq!(resolve_jump(&mut f, &mut dj), JumpOutcome::Started);
        assert_eq!(resolve_jump(&mut f, &mut dj), JumpOutcome::Ignored);
    }
}
