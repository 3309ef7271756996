//! Animator flags and locomotion pose playback.
//!
//! Gameplay code only flips the booleans on [`AnimatorFlags`]. Everything
//! downstream reads them: the pose selector picks a clip for Bevy's
//! `AnimationPlayer`, and [`JumpCue`] turns a jump trigger into a
//! [`JumpTakeoff`] after the takeoff delay, which is the moment the jump
//! clip pushes off the ground.

use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use std::time::Duration;

use crate::player::{JumpTakeoff, Player};
use crate::settings::Settings;

/// Boolean animation parameters for the locomotion graph.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimatorFlags {
    pub walking: bool,
    pub running: bool,
    pub jumping: bool,
    // Bumped on every jump trigger, including a re-trigger while `jumping` is already set.
    jump_trigger: u32,
}

impl AnimatorFlags {
    /// Set `jumping` and register a new jump trigger.
    pub fn trigger_jump(&mut self) {
        self.jumping = true;
        self.jump_trigger = self.jump_trigger.wrapping_add(1);
    }

    #[must_use]
    pub fn jump_trigger(&self) -> u32 {
        self.jump_trigger
    }

    #[must_use]
    pub fn pose(&self) -> LocomotionPose {
        LocomotionPose::from_flags(self)
    }
}

/// Clip selected by the flags. Index order matches the clip order in the
/// character model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocomotionPose {
    Idle,
    Walk,
    Run,
    Jump,
}

impl LocomotionPose {
    pub const ALL: [LocomotionPose; 4] = [Self::Idle, Self::Walk, Self::Run, Self::Jump];

    /// Jump wins over run, run over walk. Running in place still shows the
    /// run pose.
    #[must_use]
    pub fn from_flags(flags: &AnimatorFlags) -> Self {
        if flags.jumping {
            Self::Jump
        } else if flags.running {
            Self::Run
        } else if flags.walking {
            Self::Walk
        } else {
            Self::Idle
        }
    }

    #[must_use]
    pub fn loops(self) -> bool {
        !matches!(self, Self::Jump)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Delay rounded to whole microseconds, so a delay that is a multiple of the
/// tick length finishes on that tick.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn delay_duration(secs: f32) -> Duration {
    Duration::from_micros((f64::from(secs.max(0.0)) * 1e6).round() as u64)
}

/// Pending takeoff for the current jump trigger.
#[derive(Component, Debug, Default)]
pub struct JumpCue {
    seen_trigger: u32,
    timer: Option<Timer>,
}

impl JumpCue {
    /// Advance the cue by `dt`.
    ///
    /// A new trigger restarts the countdown. Returns `true` on the tick the
    /// takeoff should happen.
    pub fn tick(&mut self, flags: &AnimatorFlags, delay: f32, dt: Duration) -> bool {
        if flags.jump_trigger() != self.seen_trigger {
            self.seen_trigger = flags.jump_trigger();
            if delay <= 0.0 {
                self.timer = None;
                return true;
            }
            self.timer = Some(Timer::new(delay_duration(delay), TimerMode::Once));
        }
        let Some(timer) = self.timer.as_mut() else { return false };
        if timer.tick(dt).finished() {
            self.timer = None;
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }
}

/// Emit `JumpTakeoff` when a jump trigger's takeoff delay has elapsed.
#[allow(clippy::needless_pass_by_value)]
pub fn tick_jump_cue(
    time: Res<Time>,
    settings: Res<Settings>,
    mut players: Query<(Entity, &AnimatorFlags, &mut JumpCue), With<Player>>,
    mut takeoffs: EventWriter<JumpTakeoff>,
) {
    for (entity, flags, mut cue) in &mut players {
        if cue.tick(flags, settings.animation.takeoff_delay, time.delta()) {
            takeoffs.send(JumpTakeoff { entity });
        }
    }
}

/// Animation graph and one node per [`LocomotionPose`].
#[derive(Resource)]
pub struct PlayerAnimations {
    pub graph: Handle<AnimationGraph>,
    pub nodes: [AnimationNodeIndex; 4],
}

impl PlayerAnimations {
    #[must_use]
    pub fn node(&self, pose: LocomotionPose) -> AnimationNodeIndex {
        self.nodes[pose.index()]
    }
}

/// Playback state stored next to each hooked `AnimationPlayer`.
#[derive(Component, Debug, Default)]
pub struct LocomotionAnimator {
    pose: Option<LocomotionPose>,
    jump_trigger: u32,
}

/// Build the locomotion graph from the configured model's first four clips.
#[allow(clippy::needless_pass_by_value)]
pub fn setup_player_animations(
    mut commands: Commands,
    settings: Res<Settings>,
    asset_server: Res<AssetServer>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let Some(path) = settings.animation.model_path.clone() else {
        info!("no character model configured, locomotion clips disabled");
        return;
    };
    let clips: [Handle<AnimationClip>; 4] = LocomotionPose::ALL
        .map(|pose| asset_server.load(GltfAssetLabel::Animation(pose.index()).from_asset(path.clone())));
    let mut graph = AnimationGraph::new();
    let root = graph.root;
    let nodes = clips.map(|clip| graph.add_clip(clip, 1.0, root));
    commands.insert_resource(PlayerAnimations { graph: graphs.add(graph), nodes });
}

/// Give newly spawned animation players the locomotion graph.
#[allow(clippy::needless_pass_by_value)]
pub fn attach_animation_graph(
    mut commands: Commands,
    animations: Option<Res<PlayerAnimations>>,
    added: Query<Entity, Added<AnimationPlayer>>,
) {
    let Some(animations) = animations else { return };
    for entity in &added {
        commands.entity(entity).insert((
            animations.graph.clone(),
            AnimationTransitions::new(),
            LocomotionAnimator::default(),
        ));
    }
}

/// Cross-fade to the pose clip whenever the player's flags select a new one.
#[allow(clippy::needless_pass_by_value)]
pub fn drive_locomotion_animation(
    settings: Res<Settings>,
    animations: Option<Res<PlayerAnimations>>,
    flags: Query<&AnimatorFlags, With<Player>>,
    mut players: Query<(&mut AnimationPlayer, &mut AnimationTransitions, &mut LocomotionAnimator)>,
) {
    let Some(animations) = animations else { return };
    let Ok(flags) = flags.get_single() else { return };
    let pose = flags.pose();
    let fade = Duration::from_millis(settings.animation.crossfade_ms);

    for (mut player, mut transitions, mut state) in &mut players {
        let retriggered = pose == LocomotionPose::Jump && state.jump_trigger != flags.jump_trigger();
        if state.pose == Some(pose) && !retriggered {
            continue;
        }
        let active = transitions.play(&mut player, animations.node(pose), fade);
        if pose.loops() {
            active.repeat();
        }
        state.pose = Some(pose);
        state.jump_trigger = flags.jump_trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_priority() {
        let mut f = AnimatorFlags::default();
        assert_eq!(f.pose(), LocomotionPose::Idle);
        f.walking = true;
        assert_eq!(f.pose(), LocomotionPose::Walk);
        f.running = true;
        assert_eq!(f.pose(), LocomotionPose::Run);
        f.jumping = true;
        assert_eq!(f.pose(), LocomotionPose::Jump);
    }

    #[test]
    fn retrigger_bumps_counter_while_flag_stays_set() {
        let mut f = AnimatorFlags::default();
        f.trigger_jump();
        let first = f.jump_trigger();
        f.trigger_jump();
        assert!(f.jumping);
        assert_ne!(f.jump_trigger(), first);
    }

    #[test]
    fn cue_without_delay_fires_on_trigger_tick() {
        let mut f = AnimatorFlags::default();
        let mut cue = JumpCue::default();
        assert!(!cue.tick(&f, 0.0, Duration::from_millis(20)));
        f.trigger_jump();
        assert!(cue.tick(&f, 0.0, Duration::from_millis(20)));
        assert!(!cue.tick(&f, 0.0, Duration::from_millis(20)));
    }

    #[test]
    fn cue_waits_for_delay() {
        let mut f = AnimatorFlags::default();
        let mut cue = JumpCue::default();
        f.trigger_jump();
        let dt = Duration::from_millis(50);
        assert!(!cue.tick(&f, 0.12, dt));
        assert!(cue.is_pending());
        assert!(!cue.tick(&f, 0.12, dt));
        assert!(cue.tick(&f, 0.12, dt));
        assert!(!cue.is_pending());
    }

    #[test]
    fn delay_that_is_a_tick_multiple_fires_on_time() {
        let mut f = AnimatorFlags::default();
        let mut cue = JumpCue::default();
        f.trigger_jump();
        let dt = Duration::from_millis(20);
        assert!(!cue.tick(&f, 0.04, dt));
        assert!(cue.tick(&f, 0.04, dt));
        assert_eq!(delay_duration(0.1), Duration::from_millis(100));
    }

    #[test]
    fn setup_builds_one_node_per_pose() {
        use bevy::ecs::system::RunSystemOnce;

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<AnimationClip>()
            .init_asset::<AnimationGraph>();
        let mut settings = Settings::default();
        settings.animation.model_path = Some("models/character.glb".to_string());
        app.insert_resource(settings);

        app.world_mut().run_system_once(setup_player_animations);

        let animations = app.world().resource::<PlayerAnimations>();
        let nodes = LocomotionPose::ALL.map(|pose| animations.node(pose));
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        let graphs = app.world().resource::<Assets<AnimationGraph>>();
        assert!(graphs.get(&animations.graph).is_some());
    }

    #[test]
    fn setup_without_model_skips_graph() {
        use bevy::ecs::system::RunSystemOnce;

        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<AnimationClip>()
            .init_asset::<AnimationGraph>()
            .insert_resource(Settings::default());

        app.world_mut().run_system_once(setup_player_animations);

        assert!(!app.world().contains_resource::<PlayerAnimations>());
    }

    #[test]
    fn retrigger_restarts_pending_cue() {
        let mut f = AnimatorFlags::default();
        let mut cue = JumpCue::default();
        let dt = Duration::from_millis(50);
        f.trigger_jump();
        assert!(!cue.tick(&f, 0.1, dt));
        f.trigger_jump();
        // Countdown starts over from the re-trigger.
        assert!(!cue.tick(&f, 0.1, dt));
        assert!(cue.tick(&f, 0.1, dt));
    }
}
