//! Settings loading and hot-reloading.
//!
//! Settings are read from RON files in a directory (normally `data/settings`).
//! The first file that parses wins; when none does, defaults are used. Values
//! that fail [`Settings::validate`] are logged and replaced by their defaults.
use crate::ron_loader::{load_ron_files, setup_ron_watcher, RonWatcher};
use crate::settings::Settings;
use bevy::prelude::*;

/// Directory the game reads its settings from.
pub const SETTINGS_DIR: &str = "data/settings";

/// Hot-reload watcher for the settings directory.
#[derive(Resource)]
pub struct SettingsWatcher {
    pub dir: String,
    pub watcher: RonWatcher,
}

impl SettingsWatcher {
    #[must_use]
    pub fn stub(dir: &str) -> Self {
        SettingsWatcher { dir: dir.to_string(), watcher: RonWatcher::stub() }
    }
}

/// Load settings from `path`, repairing invalid values.
///
/// # Example
/// ```no_run
/// let settings = stride::settings::loader::load_settings_from_dir("data/settings");
/// assert!(settings.validate().is_empty());
/// ```
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    let Some(raw) = load_ron_files::<Settings>(path).into_iter().next() else {
        info!("no settings found in '{path}', using defaults");
        return Settings::defaults();
    };
    let (settings, errors) = raw.sanitized();
    for e in &errors {
        warn!("settings: {e}; using default");
    }
    settings
}

/// Create a watcher for the settings directory.
///
/// # Errors
/// Propagates the `notify::Error` when the directory cannot be watched.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    let watcher = setup_ron_watcher(path)?;
    Ok(SettingsWatcher { dir: path.to_string(), watcher })
}

/// Reload the `Settings` resource when the watcher reports a change.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.watcher.take_changed() {
        println!("Settings changed, reloading...");
        *settings = load_settings_from_dir(&watcher.dir);
    }
}
