//! Player action map.
//!
//! `PlayerActions` is rebuilt every frame in `PreUpdate` from the keyboard
//! keybinds in [`Settings`] and the first connected gamepad. Gameplay systems
//! only ever read actions (move / jump / run), never raw devices, and a
//! disabled map reads as if nothing were pressed.

use bevy::input::gamepad::{Gamepad, GamepadAxis, GamepadAxisType, GamepadButton, GamepadButtonType, Gamepads};
use bevy::prelude::*;

use crate::settings::{ControlsSettings, Settings};

/// Axis magnitude above which the move action counts as pressed.
pub const MOVE_PRESS_THRESHOLD: f32 = 0.05;

/// Action state for the local player.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerActions {
    enabled: bool,
    move_axis: Vec2,
    jump: bool,
    run: bool,
}

impl PlayerActions {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disable the map and drop any held state.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.move_axis = Vec2::ZERO;
        self.jump = false;
        self.run = false;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Store this frame's raw device state.
    pub fn set(&mut self, move_axis: Vec2, jump: bool, run: bool) {
        self.move_axis = move_axis.clamp_length_max(1.0);
        self.jump = jump;
        self.run = run;
    }

    #[must_use]
    pub fn move_pressed(&self) -> bool {
        self.enabled && self.move_axis.length() > MOVE_PRESS_THRESHOLD
    }

    /// Current move axis, zero unless the move action is pressed.
    #[must_use]
    pub fn move_value(&self) -> Vec2 {
        if self.move_pressed() { self.move_axis } else { Vec2::ZERO }
    }

    #[must_use]
    pub fn jump_pressed(&self) -> bool {
        self.enabled && self.jump
    }

    #[must_use]
    pub fn run_pressed(&self) -> bool {
        self.enabled && self.run
    }
}

/// Combine directional keys into a move axis (x = right, y = forward).
#[must_use]
pub fn keyboard_axis(keys: &ButtonInput<KeyCode>, controls: &ControlsSettings) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if keys.pressed(controls.key("forward", KeyCode::KeyW)) {
        axis.y += 1.0;
    }
    if keys.pressed(controls.key("back", KeyCode::KeyS)) {
        axis.y -= 1.0;
    }
    if keys.pressed(controls.key("left", KeyCode::KeyA)) {
        axis.x -= 1.0;
    }
    if keys.pressed(controls.key("right", KeyCode::KeyD)) {
        axis.x += 1.0;
    }
    axis.normalize_or_zero()
}

/// Zero a stick reading inside the deadzone.
#[must_use]
pub fn apply_deadzone(stick: Vec2, deadzone: f32) -> Vec2 {
    if stick.length() <= deadzone { Vec2::ZERO } else { stick.clamp_length_max(1.0) }
}

/// Rebuild `PlayerActions` from keyboard and gamepad state.
#[allow(clippy::needless_pass_by_value)]
pub fn gather_player_actions(
    keys: Res<ButtonInput<KeyCode>>,
    gamepads: Option<Res<Gamepads>>,
    axes: Option<Res<Axis<GamepadAxis>>>,
    buttons: Option<Res<ButtonInput<GamepadButton>>>,
    settings: Res<Settings>,
    mut actions: ResMut<PlayerActions>,
) {
    let controls = &settings.controls;
    let mut move_axis = keyboard_axis(&keys, controls);
    let mut jump = keys.pressed(controls.key("jump", KeyCode::Space));
    let mut run = keys.pressed(controls.key("run", KeyCode::ShiftLeft));

    let pad: Option<Gamepad> = gamepads.as_ref().and_then(|g| g.iter().next());
    if let (Some(pad), Some(axes), Some(buttons)) = (pad, axes, buttons) {
        let stick = Vec2::new(
            axes.get(GamepadAxis::new(pad, GamepadAxisType::LeftStickX)).unwrap_or(0.0),
            axes.get(GamepadAxis::new(pad, GamepadAxisType::LeftStickY)).unwrap_or(0.0),
        );
        let stick = apply_deadzone(stick, controls.gamepad_deadzone);
        if stick != Vec2::ZERO {
            move_axis = (move_axis + stick).clamp_length_max(1.0);
        }
        jump |= buttons.pressed(GamepadButton::new(pad, GamepadButtonType::South));
        run |= buttons.pressed(GamepadButton::new(pad, GamepadButtonType::LeftTrigger))
            || buttons.pressed(GamepadButton::new(pad, GamepadButtonType::LeftThumb));
    }

    actions.set(move_axis, jump, run);
}
