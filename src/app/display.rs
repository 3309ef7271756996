//! Display-related systems, such as syncing vsync
//! settings from the main `Settings` resource to the primary window's present mode.
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow};
use stride::settings::Settings;

/// Present mode for a vsync preference.
///
/// # Arguments
/// - `vsync`: `true` caps the frame rate to the display refresh rate.
pub fn present_mode(vsync: bool) -> PresentMode {
    if vsync { PresentMode::AutoVsync } else { PresentMode::AutoNoVsync }
}

/// Sync `Settings.graphics.vsync` into the primary window's present mode so
/// it can be toggled by editing the settings file.
///
/// # Arguments
/// - `settings`: The current settings resource, from which the vsync preference is read.
/// - `windows`: Query for the primary window to update its present mode.
/// - `last`: A local cache of the last applied vsync state to avoid redundant updates.
///
/// # Example
/// ```ignore
/// app.add_systems(Update, crate::app::sync_vsync_settings);
/// ```
pub fn sync_vsync_settings(
    settings: Res<Settings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut last: Local<Option<bool>>,
) {
    let desired = settings.graphics.vsync;
    if *last == Some(desired) {
        return;
    }
    for mut w in &mut windows {
        w.present_mode = present_mode(desired);
    }
    *last = Some(desired);
}
