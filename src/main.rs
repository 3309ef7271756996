use avian3d::prelude::*;
use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{Window, WindowPlugin};
use bevy_atmosphere::prelude::*;
use stride::debug::DebugDumpPlugin;
use stride::player::PlayerControllerPlugin;
use stride::settings::loader::{self as settings_loader, SETTINGS_DIR};
use stride::ui::{
    render_facing_gizmo, setup_debug_overlay, spawn_debug_overlay, toggle_debug_overlay,
    update_debug_overlay,
};

mod app;
use app::{setup, sync_atmosphere_settings, sync_vsync_settings};

// Controller and physics tick rate.
pub const PHYSICS_TICK_RATE: f64 = 50.0;

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(SETTINGS_DIR).unwrap_or_else(|_| settings_loader::SettingsWatcher::stub(SETTINGS_DIR));

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "stride".to_string(),
            position: WindowPosition::Centered(MonitorSelection::Primary),
            present_mode: app::display::present_mode(settings.graphics.vsync),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(PhysicsPlugins::new(FixedPostUpdate))
    .insert_resource(Time::<Fixed>::from_hz(PHYSICS_TICK_RATE))
    .add_plugins(FrameTimeDiagnosticsPlugin)
    .add_plugins(LogDiagnosticsPlugin::default())
    .add_plugins(DebugDumpPlugin);

    if settings.atmosphere.enabled {
        app.add_plugins(AtmospherePlugin)
            .insert_resource(AtmosphereModel::default())
            .insert_resource(AtmosphereSettings {
                resolution: settings.atmosphere.resolution,
                dithering: settings.atmosphere.dithering,
                ..Default::default()
            })
            .add_systems(Update, sync_atmosphere_settings);
    }

    app.insert_resource(settings);
    app.insert_resource(settings_watcher);
    app.add_plugins(PlayerControllerPlugin);

    app.add_systems(Startup, (setup, setup_debug_overlay, spawn_debug_overlay));
    app.add_systems(PreUpdate, settings_loader::check_settings_changes);
    app.add_systems(
        Update,
        (sync_vsync_settings, toggle_debug_overlay, update_debug_overlay, render_facing_gizmo),
    );

    app.run();
}
