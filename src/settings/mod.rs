//! Settings, types and defaults.
//!
//! Settings are stored as RON under `data/settings/` and hot-reloaded through
//! the watcher in [`crate::ron`]. Every field carries a serde default so a
//! file only needs to mention what it overrides.
use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    #[serde(default = "GraphicsSettings::default_vsync")]
    pub vsync: bool, // Cap FPS to the display refresh rate.
}

impl GraphicsSettings {
    fn default_vsync() -> bool { true }
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self { vsync: Self::default_vsync() }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert mouse Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert mouse X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32,
    #[serde(default = "ControlsSettings::default_deadzone")]
    pub gamepad_deadzone: f32, // Stick magnitude below which the move axis reads as zero.
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Action name -> key identifier
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 20.0 }
    fn default_deadzone() -> f32 { 0.15 }

    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("jump", "Space"),
            ("run", "LShift"),
            ("pause", "Escape"),
            ("toggle_debug", "F1"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// binding is missing or names an unknown key.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            gamepad_deadzone: Self::default_deadzone(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// When the run action fires a camera-shake impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShakeTrigger {
    /// One impulse per physics tick while run is held.
    #[default]
    EveryTick,
    /// One impulse on the tick run goes from released to held.
    OnPress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementSettings {
    #[serde(default = "MovementSettings::default_base_speed")]
    pub base_speed: f32, // Walking speed in world units per second.
    #[serde(default = "MovementSettings::default_boost")]
    pub boost_multiplier: f32, // Speed multiplier while running.
    #[serde(default = "MovementSettings::default_jump_impulse")]
    pub jump_impulse: f32, // Upward impulse applied at takeoff (N*s).
    #[serde(default)]
    pub shake_trigger: ShakeTrigger,
}

impl MovementSettings {
    fn default_base_speed() -> f32 { 10.0 }
    fn default_boost() -> f32 { 3.0 }
    fn default_jump_impulse() -> f32 { 6.0 }
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            base_speed: Self::default_base_speed(),
            boost_multiplier: Self::default_boost(),
            jump_impulse: Self::default_jump_impulse(),
            shake_trigger: ShakeTrigger::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default = "CameraSettings::default_distance")]
    pub distance: f32, // Distance from the player's pivot to the camera.
    #[serde(default = "CameraSettings::default_height")]
    pub height: f32, // Height of the look-at pivot above the player origin.
    #[serde(default = "CameraSettings::default_shake_strength")]
    pub shake_strength: f32, // Trauma added per shake impulse.
    #[serde(default = "CameraSettings::default_shake_decay")]
    pub shake_decay: f32, // Trauma removed per second.
    #[serde(default = "CameraSettings::default_shake_offset")]
    pub shake_max_offset: f32, // Maximum positional offset at full trauma.
    #[serde(default = "CameraSettings::default_shake_roll")]
    pub shake_max_roll_deg: f32,
    #[serde(default = "CameraSettings::default_shake_frequency")]
    pub shake_frequency: f32, // Noise samples per second.
}

impl CameraSettings {
    fn default_distance() -> f32 { 6.0 }
    fn default_height() -> f32 { 1.5 }
    fn default_shake_strength() -> f32 { 0.08 }
    fn default_shake_decay() -> f32 { 1.5 }
    fn default_shake_offset() -> f32 { 0.25 }
    fn default_shake_roll() -> f32 { 2.0 }
    fn default_shake_frequency() -> f32 { 18.0 }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: Self::default_distance(),
            height: Self::default_height(),
            shake_strength: Self::default_shake_strength(),
            shake_decay: Self::default_shake_decay(),
            shake_max_offset: Self::default_shake_offset(),
            shake_max_roll_deg: Self::default_shake_roll(),
            shake_frequency: Self::default_shake_frequency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSettings {
    #[serde(default)]
    pub model_path: Option<String>, // glTF with Idle/Walk/Run/Jump clips, relative to `assets/`.
    #[serde(default)]
    pub takeoff_delay: f32, // Seconds between the jump flag and the takeoff impulse.
    #[serde(default = "AnimationSettings::default_crossfade_ms")]
    pub crossfade_ms: u64,
}

impl AnimationSettings {
    fn default_crossfade_ms() -> u64 { 200 }
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            takeoff_delay: 0.0,
            crossfade_ms: Self::default_crossfade_ms(),
        }
    }
}

/// Atmosphere settings for the `bevy_atmosphere` sky.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmosphereSettings {
    #[serde(default = "AtmosphereSettings::default_enabled")]
    pub enabled: bool, // Requires a restart.
    #[serde(default = "AtmosphereSettings::default_resolution")]
    pub resolution: u32, // Resolution of each skybox face.
    #[serde(default = "AtmosphereSettings::default_dithering")]
    pub dithering: bool,
}

impl AtmosphereSettings {
    fn default_enabled() -> bool { true }
    fn default_resolution() -> u32 { 512 }
    fn default_dithering() -> bool { true }
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            resolution: Self::default_resolution(),
            dithering: Self::default_dithering(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub graphics: GraphicsSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
    #[serde(default)]
    pub movement: MovementSettings,
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub animation: AnimationSettings,
    #[serde(default)]
    pub atmosphere: AtmosphereSettings,
}

/// A settings value that cannot be used as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    NonPositive { field: &'static str, value: f32 },
    Negative { field: &'static str, value: f32 },
    BoostBelowOne(f32),
    DeadzoneOutOfRange(f32),
    UnknownKey { action: String, key: String },
    BadResolution(u32),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::NonPositive { field, value } => write!(f, "{field} must be > 0 (got {value})"),
            SettingsError::Negative { field, value } => write!(f, "{field} must be >= 0 (got {value})"),
            SettingsError::BoostBelowOne(v) => write!(f, "movement.boost_multiplier must be >= 1 (got {v})"),
            SettingsError::DeadzoneOutOfRange(v) => write!(f, "controls.gamepad_deadzone must be in [0, 1) (got {v})"),
            SettingsError::UnknownKey { action, key } => write!(f, "keybind '{action}' names unknown key '{key}'"),
            SettingsError::BadResolution(r) => write!(f, "atmosphere.resolution must be a non-zero multiple of 8 (got {r})"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Check every value the controller depends on.
    ///
    /// # Returns
    /// All problems found, empty when the settings are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<SettingsError> {
        let mut errors = Vec::new();
        let mut positive = |field: &'static str, value: f32| {
            if !(value > 0.0) {
                errors.push(SettingsError::NonPositive { field, value });
            }
        };
        positive("movement.base_speed", self.movement.base_speed);
        positive("movement.jump_impulse", self.movement.jump_impulse);
        positive("controls.mouse_sensitivity", self.controls.mouse_sensitivity);
        positive("camera.distance", self.camera.distance);
        positive("camera.shake_decay", self.camera.shake_decay);
        positive("camera.shake_frequency", self.camera.shake_frequency);

        for (field, value) in [
            ("camera.shake_strength", self.camera.shake_strength),
            ("camera.shake_max_offset", self.camera.shake_max_offset),
            ("camera.shake_max_roll_deg", self.camera.shake_max_roll_deg),
            ("animation.takeoff_delay", self.animation.takeoff_delay),
        ] {
            if !(value >= 0.0) {
                errors.push(SettingsError::Negative { field, value });
            }
        }

        if !(self.movement.boost_multiplier >= 1.0) {
            errors.push(SettingsError::BoostBelowOne(self.movement.boost_multiplier));
        }
        if !(0.0..1.0).contains(&self.controls.gamepad_deadzone) {
            errors.push(SettingsError::DeadzoneOutOfRange(self.controls.gamepad_deadzone));
        }
        let r = self.atmosphere.resolution;
        if r == 0 || r % 8 != 0 {
            errors.push(SettingsError::BadResolution(r));
        }

        let mut keys: Vec<_> = self.controls.keybinds.iter().collect();
        keys.sort();
        for (action, key) in keys {
            if Self::keycode_from_str(key).is_none() {
                errors.push(SettingsError::UnknownKey { action: action.clone(), key: key.clone() });
            }
        }
        errors
    }

    /// Replace every invalid value with its default.
    ///
    /// # Returns
    /// The repaired settings and the problems that were fixed.
    #[must_use]
    pub fn sanitized(mut self) -> (Self, Vec<SettingsError>) {
        let errors = self.validate();
        if errors.is_empty() {
            return (self, errors);
        }
        let d = Settings::default();
        for e in &errors {
            match e {
                SettingsError::NonPositive { field, .. } | SettingsError::Negative { field, .. } => {
                    match *field {
                        "movement.base_speed" => self.movement.base_speed = d.movement.base_speed,
                        "movement.jump_impulse" => self.movement.jump_impulse = d.movement.jump_impulse,
                        "controls.mouse_sensitivity" => self.controls.mouse_sensitivity = d.controls.mouse_sensitivity,
                        "camera.distance" => self.camera.distance = d.camera.distance,
                        "camera.shake_decay" => self.camera.shake_decay = d.camera.shake_decay,
                        "camera.shake_frequency" => self.camera.shake_frequency = d.camera.shake_frequency,
                        "camera.shake_strength" => self.camera.shake_strength = d.camera.shake_strength,
                        "camera.shake_max_offset" => self.camera.shake_max_offset = d.camera.shake_max_offset,
                        "camera.shake_max_roll_deg" => self.camera.shake_max_roll_deg = d.camera.shake_max_roll_deg,
                        "animation.takeoff_delay" => self.animation.takeoff_delay = d.animation.takeoff_delay,
                        _ => {}
                    }
                }
                SettingsError::BoostBelowOne(_) => self.movement.boost_multiplier = d.movement.boost_multiplier,
                SettingsError::DeadzoneOutOfRange(_) => self.controls.gamepad_deadzone = d.controls.gamepad_deadzone,
                SettingsError::BadResolution(_) => self.atmosphere.resolution = d.atmosphere.resolution,
                // Unknown keys are resolved to their defaults at lookup time.
                SettingsError::UnknownKey { .. } => {}
            }
        }
        (self, errors)
    }

    /// Convert a key identifier from `controls.keybinds` (e.g. "W", "Space",
    /// "LShift", "F1") into a `KeyCode`. Matching is case-insensitive.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
            KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
            KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
            KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
            KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
            KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];
        const FUNCTION: [KeyCode; 12] = [
            KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
            KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
        ];

        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(LETTERS[(c as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[(c as u8 - b'0') as usize]);
            }
        }
        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<usize>().ok()) {
            return (1..=FUNCTION.len()).contains(&n).then(|| FUNCTION[n - 1]);
        }

        Some(match s.as_str() {
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" => KeyCode::Backspace,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            "CAPSLOCK" => KeyCode::CapsLock,
            _ => return None,
        })
    }
}

pub mod loader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_empty());
    }

    #[test]
    fn partial_ron_keeps_defaults_for_missing_fields() {
        let s: Settings = ron::from_str("(movement: (base_speed: 4.0))").unwrap();
        assert_eq!(s.movement.base_speed, 4.0);
        assert_eq!(s.movement.boost_multiplier, 3.0);
        assert_eq!(s.movement.shake_trigger, ShakeTrigger::EveryTick);
        assert_eq!(s.controls.key("jump", KeyCode::KeyJ), KeyCode::Space);
    }

    #[test]
    fn shake_trigger_parses_from_ron() {
        let s: Settings = ron::from_str("(movement: (shake_trigger: OnPress))").unwrap();
        assert_eq!(s.movement.shake_trigger, ShakeTrigger::OnPress);
    }

    #[test]
    fn keycodes_parse_case_insensitively() {
        assert_eq!(Settings::keycode_from_str("w"), Some(KeyCode::KeyW));
        assert_eq!(Settings::keycode_from_str("7"), Some(KeyCode::Digit7));
        assert_eq!(Settings::keycode_from_str("f12"), Some(KeyCode::F12));
        assert_eq!(Settings::keycode_from_str("LShift"), Some(KeyCode::ShiftLeft));
        assert_eq!(Settings::keycode_from_str("F13"), None);
        assert_eq!(Settings::keycode_from_str("banana"), None);
    }

    #[test]
    fn unknown_binding_falls_back_to_default_key() {
        let mut c = ControlsSettings::default();
        c.keybinds.insert("run".into(), "NotAKey".into());
        assert_eq!(c.key("run", KeyCode::ShiftLeft), KeyCode::ShiftLeft);
        assert_eq!(c.key("missing", KeyCode::KeyQ), KeyCode::KeyQ);
    }

    #[test]
    fn invalid_values_are_reported_and_repaired() {
        let mut s = Settings::default();
        s.movement.base_speed = -1.0;
        s.movement.boost_multiplier = 0.5;
        s.animation.takeoff_delay = f32::NAN;
        s.atmosphere.resolution = 100;

        let errors = s.validate();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&SettingsError::BoostBelowOne(0.5)));

        let (fixed, fixed_errors) = s.sanitized();
        assert_eq!(fixed_errors.len(), 4);
        assert!(fixed.validate().is_empty());
        assert_eq!(fixed.movement.base_speed, 10.0);
        assert_eq!(fixed.movement.boost_multiplier, 3.0);
        assert_eq!(fixed.animation.takeoff_delay, 0.0);
        assert_eq!(fixed.atmosphere.resolution, 512);
    }
}
