//! Player controller: input to physics, animation flags and camera feedback.
//!
//! The module provides the `Player` marker, the per-player [`MovementBridge`]
//! state, a [`PlayerBundle`] with everything a controllable body needs, and
//! [`PlayerControllerPlugin`], which wires the systems into Bevy's schedules.
//!
//! # Example:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use avian3d::prelude::*;
//! use stride::player::{PlayerBundle, PlayerControllerPlugin};
//! use stride::settings::Settings;
//!
//! fn spawn(mut commands: Commands, settings: Res<Settings>) {
//!     commands.spawn((
//!         SpatialBundle::from_transform(Transform::from_xyz(0.0, 2.0, 0.0)),
//!         PlayerBundle::new(&settings),
//!     ));
//! }
//!
//! App::new()
//!     .add_plugins((DefaultPlugins, PhysicsPlugins::new(FixedPostUpdate)))
//!     .add_plugins(PlayerControllerPlugin)
//!     .add_systems(Startup, spawn)
//!     .run();
//! ```
pub mod activation;
pub mod jump;
pub mod locomotion;
pub mod movement;

use avian3d::prelude::*;
use bevy::input::InputSystem;
use bevy::prelude::*;

pub use activation::*;
pub use jump::*;
pub use locomotion::*;
pub use movement::*;

use crate::animation::{
    attach_animation_graph, drive_locomotion_animation, setup_player_animations, tick_jump_cue,
    AnimatorFlags, JumpCue,
};
use crate::camera::{
    accumulate_shake, apply_camera_shake, camera_look, follow_player, ImpulseSource, ShakeImpulse,
};
use crate::input::{gather_player_actions, PlayerActions};
use crate::settings::Settings;

/// Marks the locally controlled character.
#[derive(Component, Debug, Default)]
pub struct Player;

/// Mutable locomotion state of a player.
#[derive(Component, Debug, Clone)]
pub struct MovementBridge {
    /// Current speed in world units per second (base or boosted).
    pub speed: f32,
    /// Whether an airborne re-jump is still available.
    pub can_double_jump: bool,
    /// Whether run was held on the previous tick.
    pub run_held: bool,
}

impl MovementBridge {
    #[must_use]
    pub fn new(base_speed: f32) -> Self {
        Self { speed: base_speed, can_double_jump: true, run_held: false }
    }
}

/// Components for a controllable capsule character.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub bridge: MovementBridge,
    pub flags: AnimatorFlags,
    pub jump_cue: JumpCue,
    pub impulse_source: ImpulseSource,
    pub rigid_body: RigidBody,
    pub collider: Collider,
    pub locked_axes: LockedAxes,
    pub friction: Friction,
    pub restitution: Restitution,
    pub external_impulse: ExternalImpulse,
}

impl PlayerBundle {
    /// Capsule radius and cylinder length of the default body.
    pub const CAPSULE: (f32, f32) = (0.4, 1.0);

    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let (radius, length) = Self::CAPSULE;
        Self {
            player: Player,
            bridge: MovementBridge::new(settings.movement.base_speed),
            flags: AnimatorFlags::default(),
            jump_cue: JumpCue::default(),
            impulse_source: ImpulseSource::new(settings.camera.shake_strength),
            rigid_body: RigidBody::Dynamic,
            collider: Collider::capsule(radius, length),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            friction: Friction::ZERO.with_combine_rule(CoefficientCombine::Min),
            restitution: Restitution::ZERO.with_combine_rule(CoefficientCombine::Min),
            external_impulse: ExternalImpulse::default(),
        }
    }
}

/// Registers the controller's resources, events, state and systems.
///
/// Expects avian's `PhysicsPlugins` to run in `FixedPostUpdate` so every
/// `FixedUpdate` tick of the controller is followed by one physics step.
pub struct PlayerControllerPlugin;

impl Plugin for PlayerControllerPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Settings>() {
            app.insert_resource(Settings::default());
        }

        app.init_state::<ControlState>()
            .init_resource::<PlayerActions>()
            .add_event::<ShakeImpulse>()
            .add_event::<JumpTakeoff>()
            .add_systems(OnEnter(ControlState::Active), activate_controls)
            .add_systems(OnExit(ControlState::Active), deactivate_controls)
            .add_systems(Startup, setup_player_animations)
            .add_systems(PreUpdate, gather_player_actions.after(InputSystem))
            .add_systems(
                Update,
                (
                    toggle_control_state,
                    (camera_look, follow_player, face_move_target, accumulate_shake, apply_camera_shake)
                        .chain(),
                    (attach_animation_graph, drive_locomotion_animation).chain(),
                ),
            )
            .add_systems(
                FixedUpdate,
                (detect_ground_contact, movement_tick, tick_jump_cue, apply_jump_impulse).chain(),
            );
    }
}
