//! Debug overlay and gizmos.
//!
//! The overlay (F1 by default) periodically shows FPS, the player's position
//! and speed, its animator flags and the camera's shake trauma. While it is
//! visible, a gizmo arrow shows the direction the player is facing.

use avian3d::prelude::LinearVelocity;
use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::animation::AnimatorFlags;
use crate::camera::CameraShake;
use crate::player::{ControlState, MovementBridge, Player};
use crate::settings::Settings;

/// State for the debug overlay visibility.
#[derive(Resource, Default)]
pub struct DebugOverlayState {
    /// Whether the overlay is currently visible.
    pub visible: bool,
}

#[derive(Resource, Default)]
pub struct DebugOverlayTimer(pub Timer);

#[derive(Component)]
pub struct DebugOverlayText;

/// Insert debug overlay resources into the `Commands` world.
///
/// # Arguments
/// * `commands` - `Commands` to insert the refresh timer and visibility state
pub fn setup_debug_overlay(mut commands: Commands) {
    commands.insert_resource(DebugOverlayTimer(Timer::from_seconds(0.25, TimerMode::Repeating)));
    commands.insert_resource(DebugOverlayState::default());
}

/// Spawn the (initially empty) overlay text node in the top-left corner.
///
/// # Arguments
/// * `commands` - `Commands` for spawning the text bundle; uses Bevy's default font
pub fn spawn_debug_overlay(mut commands: Commands) {
    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle {
                    font_size: 18.0,
                    color: Color::srgb(1.0, 1.0, 0.0),
                    ..default()
                },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            ..default()
        },
        DebugOverlayText,
    ));
}

/// Toggle the overlay on the `toggle_debug` key.
///
/// # Arguments
/// * `state` - mutable `DebugOverlayState` resource
/// * `input` - keyboard input resource
/// * `settings` - settings, for the keybind (F1 by default)
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_overlay(
    mut state: ResMut<DebugOverlayState>,
    input: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    if input.just_pressed(settings.controls.key("toggle_debug", KeyCode::F1)) {
        state.visible = !state.visible;
    }
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

/// Overlay body for one player.
#[must_use]
pub fn format_player_status(
    position: Vec3,
    velocity: Vec3,
    bridge: &MovementBridge,
    flags: &AnimatorFlags,
) -> String {
    format!(
        "Pos: ({:.1}, {:.1}, {:.1})\nVel: ({:.1}, {:.1}, {:.1})\nSpeed: {:.1}\n\
         Walking: {} | Running: {} | Jumping: {}\nDouble jump: {}\nPose: {:?}",
        position.x,
        position.y,
        position.z,
        velocity.x,
        velocity.y,
        velocity.z,
        bridge.speed,
        on_off(flags.walking),
        on_off(flags.running),
        on_off(flags.jumping),
        if bridge.can_double_jump { "ready" } else { "spent" },
        flags.pose(),
    )
}

/// System parameters for [`update_debug_overlay`].
///
/// # Arguments
/// * `diagnostics` - diagnostics store (FPS)
/// * `state` - debug overlay visibility state
/// * `control` - current `ControlState`
/// * `time` - time resource for the refresh timer
/// * `timer` - mutable overlay timer resource
/// * `text` - text query identifying the overlay UI element
/// * `players` - player transform, velocity, bridge and animator flags
/// * `shakes` - cameras with shake state, for the trauma readout
#[derive(bevy::ecs::system::SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub control: Res<'w, State<ControlState>>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub text: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub players: Query<
        'w,
        's,
        (&'static Transform, &'static LinearVelocity, &'static MovementBridge, &'static AnimatorFlags),
        With<Player>,
    >,
    pub shakes: Query<'w, 's, &'static CameraShake>,
}

/// Refresh the overlay text on a fixed interval instead of every frame.
///
/// # Arguments
/// * `ctx` - system parameters grouped into a context struct
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use stride::ui::{setup_debug_overlay, spawn_debug_overlay, update_debug_overlay};
///
/// App::new()
///     .add_systems(Startup, (setup_debug_overlay, spawn_debug_overlay))
///     .add_systems(Update, update_debug_overlay);
/// ```
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }
    let Ok(mut text) = ctx.text.get_single_mut() else { return };

    if !ctx.state.visible {
        text.sections[0].value = String::new();
        return;
    }

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let player = ctx.players.get_single().map_or_else(
        |_| "Player: N/A".to_string(),
        |(tf, vel, bridge, flags)| format_player_status(tf.translation, vel.0, bridge, flags),
    );
    let trauma = ctx.shakes.iter().map(|s| s.trauma).fold(0.0_f32, f32::max);

    text.sections[0].value = format!(
        "FPS: {fps:.1}\nControls: {:?}\n{player}\nShake trauma: {trauma:.2}",
        ctx.control.get(),
    );
}

/// Draw the player's facing direction while the overlay is visible.
///
/// # Arguments
/// * `state` - overlay visibility; nothing is drawn while hidden
/// * `gizmos` - gizmo drawing context
/// * `players` - player transforms and flags; the arrow turns orange while running
#[allow(clippy::needless_pass_by_value)]
pub fn render_facing_gizmo(
    state: Res<DebugOverlayState>,
    mut gizmos: Gizmos,
    players: Query<(&GlobalTransform, &AnimatorFlags), With<Player>>,
) {
    if !state.visible {
        return;
    }
    for (tf, flags) in &players {
        let origin = tf.translation();
        let color = if flags.running {
            Color::srgb(1.0, 0.4, 0.1)
        } else {
            Color::srgb(0.1, 1.0, 0.3)
        };
        gizmos.arrow(origin, origin + *tf.forward() * 1.5, color);
    }
}
