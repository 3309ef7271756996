//! Sky settings sync.
use bevy::prelude::*;
use bevy_atmosphere::prelude::AtmosphereSettings as BevyAtmosphereSettings;
use stride::settings::Settings;

/// Copy `Settings.atmosphere` resolution/dithering into the running sky.
///
/// `enabled` is only read at startup; toggling it needs a restart.
pub fn sync_atmosphere_settings(
    settings: Res<Settings>,
    mut last: Local<Option<(u32, bool)>>,
    mut atm_settings: ResMut<BevyAtmosphereSettings>,
) {
    let current = (settings.atmosphere.resolution, settings.atmosphere.dithering);
    if *last == Some(current) {
        return;
    }
    atm_settings.resolution = current.0;
    atm_settings.dithering = current.1;
    *last = Some(current);
}
