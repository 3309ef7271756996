//! Controller activation: cursor lock and action map.
//!
//! While the controller is `Active` the cursor is locked and hidden and the
//! action map is enabled. Leaving `Active` reverses both. The pause key
//! suspends the controller and a left click resumes it.

use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::input::PlayerActions;
use crate::settings::Settings;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlState {
    #[default]
    Active,
    Suspended,
}

/// Lock (and hide) or release (and show) the cursor.
pub fn set_cursor_locked(window: &mut Window, locked: bool) {
    window.cursor.grab_mode = if locked { CursorGrabMode::Locked } else { CursorGrabMode::None };
    window.cursor.visible = !locked;
}

/// Runs on entering `ControlState::Active`.
pub fn activate_controls(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut actions: ResMut<PlayerActions>,
) {
    if let Ok(mut window) = windows.get_single_mut() {
        set_cursor_locked(&mut window, true);
    }
    actions.enable();
    info!("player controls enabled");
}

/// Runs on leaving `ControlState::Active`.
pub fn deactivate_controls(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut actions: ResMut<PlayerActions>,
) {
    if let Ok(mut window) = windows.get_single_mut() {
        set_cursor_locked(&mut window, false);
    }
    actions.disable();
    info!("player controls disabled");
}

/// Suspend on the pause key, resume on left click.
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_control_state(
    state: Res<State<ControlState>>,
    mut next: ResMut<NextState<ControlState>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    match state.get() {
        ControlState::Active => {
            if keys.just_pressed(settings.controls.key("pause", KeyCode::Escape)) {
                next.set(ControlState::Suspended);
            }
        }
        ControlState::Suspended => {
            if mouse.just_pressed(MouseButton::Left) {
                next.set(ControlState::Active);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn world_with_window() -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<PlayerActions>();
        let window = world.spawn((Window::default(), PrimaryWindow)).id();
        (world, window)
    }

    #[test]
    fn activation_locks_cursor_and_enables_actions() {
        let (mut world, window) = world_with_window();
        world.run_system_once(activate_controls);

        let w = world.get::<Window>(window).unwrap();
        assert_eq!(w.cursor.grab_mode, CursorGrabMode::Locked);
        assert!(!w.cursor.visible);
        assert!(world.resource::<PlayerActions>().is_enabled());
    }

    #[test]
    fn deactivation_reverses_activation() {
        let (mut world, window) = world_with_window();
        world.run_system_once(activate_controls);
        world.run_system_once(deactivate_controls);

        let w = world.get::<Window>(window).unwrap();
        assert_eq!(w.cursor.grab_mode, CursorGrabMode::None);
        assert!(w.cursor.visible);
        assert!(!world.resource::<PlayerActions>().is_enabled());
    }

    fn lifecycle_app() -> App {
        let mut app = App::new();
        app.add_plugins(bevy::state::app::StatesPlugin)
            .init_state::<ControlState>()
            .init_resource::<PlayerActions>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .insert_resource(Settings::default())
            .add_systems(OnEnter(ControlState::Active), activate_controls)
            .add_systems(OnExit(ControlState::Active), deactivate_controls)
            .add_systems(Update, toggle_control_state);
        app.world_mut().spawn((Window::default(), PrimaryWindow));
        app
    }

    fn control_state(app: &App) -> ControlState {
        *app.world().resource::<State<ControlState>>().get()
    }

    #[test]
    fn pause_key_suspends_and_click_resumes() {
        let mut app = lifecycle_app();
        app.update();
        assert_eq!(control_state(&app), ControlState::Active);
        assert!(app.world().resource::<PlayerActions>().is_enabled());

        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::Escape);
        app.update();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
        app.update();
        assert_eq!(control_state(&app), ControlState::Suspended);
        assert!(!app.world().resource::<PlayerActions>().is_enabled());

        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().press(MouseButton::Left);
        app.update();
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().clear();
        app.update();
        assert_eq!(control_state(&app), ControlState::Active);
        assert!(app.world().resource::<PlayerActions>().is_enabled());
    }

    #[test]
    fn click_while_active_changes_nothing() {
        let mut app = lifecycle_app();
        app.update();
        app.world_mut().resource_mut::<ButtonInput<MouseButton>>().press(MouseButton::Left);
        app.update();
        app.update();
        assert_eq!(control_state(&app), ControlState::Active);
    }

    #[test]
    fn activation_without_window_still_enables_actions() {
        let mut world = World::new();
        world.init_resource::<PlayerActions>();
        world.run_system_once(activate_controls);
        assert!(world.resource::<PlayerActions>().is_enabled());
    }
}
