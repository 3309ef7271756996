//! Debug dump (F3 by default): writes the controller's state, frame timing,
//! entity count and process memory to a timestamped text file in
//! `./debug-dumps/`.
//!
//! Handy for capturing "why did the jump not fire" moments without attaching
//! a debugger.
use avian3d::prelude::LinearVelocity;
use bevy::diagnostic::{Diagnostic, DiagnosticPath, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;
use sysinfo::{ProcessExt, System, SystemExt};

use crate::animation::AnimatorFlags;
use crate::camera::CameraShake;
use crate::player::{ControlState, MovementBridge, Player};
use crate::settings::Settings;

/// Directory dumps are written to.
pub const DUMP_DIR: &str = "debug-dumps";

pub struct DebugDumpPlugin;

impl Plugin for DebugDumpPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, debug_dump_system);
    }
}

/// Snapshot of one player's controller state.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    pub can_double_jump: bool,
    pub flags: AnimatorFlags,
}

fn bytes_to_mb(bytes: u64) -> String {
    format!("{:.2} MB", (bytes as f64) / 1024.0 / 1024.0)
}

/// Resident memory of this process, if the platform reports it.
fn process_memory_bytes() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_process(pid);
    sys.process(pid).map(|p| p.memory())
}

/// Render the dump text.
///
/// # Arguments
/// * `now` - timestamp written at the top of the dump
/// * `fps` / `frame_time` - smoothed diagnostics (seconds for frame time)
/// * `entity_count` - number of live entities
/// * `control` - current `ControlState`
/// * `players` - one snapshot per player
/// * `trauma` - highest camera shake trauma
/// * `memory` - resident process memory in bytes, if known
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn format_dump(
    now: DateTime<Utc>,
    fps: f64,
    frame_time: f64,
    entity_count: usize,
    control: ControlState,
    players: &[PlayerSnapshot],
    trauma: f32,
    memory: Option<u64>,
) -> String {
    let mut out = String::new();
    writeln!(out, "Debug dump: {}", now.timestamp()).ok();
    writeln!(out, "Timestamp: {}", now.to_rfc3339()).ok();
    writeln!(out, "FPS: {fps:.1}, frame_time: {:.4} ms", frame_time * 1000.0).ok();
    writeln!(out, "Entities: {entity_count}").ok();
    match memory {
        Some(bytes) => writeln!(out, "Process memory: {}", bytes_to_mb(bytes)).ok(),
        None => writeln!(out, "Process memory: unavailable").ok(),
    };
    writeln!(out, "Controls: {control:?}").ok();
    writeln!(out, "Camera shake trauma: {trauma:.3}").ok();

    if players.is_empty() {
        writeln!(out, "\nNo player spawned").ok();
    }
    for (i, p) in players.iter().enumerate() {
        writeln!(out, "\nPlayer {i}:").ok();
        writeln!(out, "  position: {:.3?}", p.position).ok();
        writeln!(out, "  velocity: {:.3?}", p.velocity).ok();
        writeln!(out, "  speed: {:.2}", p.speed).ok();
        writeln!(out, "  walking={} running={} jumping={} (trigger #{})",
            p.flags.walking, p.flags.running, p.flags.jumping, p.flags.jump_trigger()).ok();
        writeln!(out, "  pose: {:?}", p.flags.pose()).ok();
        writeln!(out, "  double jump available: {}", p.can_double_jump).ok();
    }
    out
}

/// Write a dump when the `dump_debug` key is pressed.
///
/// # Arguments
/// * `keys` - keyboard input resource
/// * `settings` - settings, for the keybind (F3 by default)
/// * `diagnostics` - diagnostics store (FPS and frame time)
/// * `control` - current `ControlState`
/// * `entities` - every entity, for the count
/// * `players` - player transform, velocity, bridge and animator flags
/// * `shakes` - cameras with shake state
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use stride::debug::DebugDumpPlugin;
///
/// // Registers `debug_dump_system` in `Update`.
/// App::new().add_plugins(DebugDumpPlugin);
/// ```
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
pub fn debug_dump_system(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    diagnostics: Res<DiagnosticsStore>,
    control: Res<State<ControlState>>,
    entities: Query<Entity>,
    players: Query<(&Transform, &LinearVelocity, &MovementBridge, &AnimatorFlags), With<Player>>,
    shakes: Query<&CameraShake>,
) {
    if !keys.just_pressed(settings.controls.key("dump_debug", KeyCode::F3)) {
        return;
    }

    let smoothed = |path: &DiagnosticPath| diagnostics.get(path).and_then(Diagnostic::smoothed).unwrap_or(0.0);
    let fps = smoothed(&FrameTimeDiagnosticsPlugin::FPS);
    let frame_time = smoothed(&FrameTimeDiagnosticsPlugin::FRAME_TIME);

    let snapshots: Vec<PlayerSnapshot> = players
        .iter()
        .map(|(tf, vel, bridge, flags)| PlayerSnapshot {
            position: tf.translation,
            velocity: vel.0,
            speed: bridge.speed,
            can_double_jump: bridge.can_double_jump,
            flags: flags.clone(),
        })
        .collect();
    let trauma = shakes.iter().map(|s| s.trauma).fold(0.0_f32, f32::max);

    let now = Utc::now();
    let out = format_dump(
        now,
        fps,
        frame_time,
        entities.iter().count(),
        *control.get(),
        &snapshots,
        trauma,
        process_memory_bytes(),
    );

    let fname: PathBuf = [DUMP_DIR, &format!("dump-{}.txt", now.format("%Y%m%d-%H%M%S"))].iter().collect();
    if let Err(e) = fs::create_dir_all(DUMP_DIR) {
        error!("debug dump: failed to create dir '{DUMP_DIR}': {e}");
        return;
    }
    if let Err(e) = fs::write(&fname, out) {
        error!("debug dump: failed to write {}: {e}", fname.display());
    } else {
        info!("wrote debug dump: {}", fname.display());
    }
}
