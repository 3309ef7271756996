//! Demo scene: a ground slab, a few platforms and crates, a light, the
//! player capsule and its follow camera.
use avian3d::prelude::*;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use bevy_atmosphere::prelude::AtmosphereCamera;
use stride::camera::{CameraShake, OrbitCamera};
use stride::player::{Ground, PlayerBundle};
use stride::settings::Settings;

#[derive(Component)]
pub struct Sun;

const GROUND_SIZE: f32 = 80.0;

// (center, size) of static platforms the player can land on.
const PLATFORMS: [(Vec3, Vec3); 4] = [
    (Vec3::new(6.0, 0.5, -6.0), Vec3::new(4.0, 1.0, 4.0)),
    (Vec3::new(10.0, 1.25, -12.0), Vec3::new(4.0, 2.5, 4.0)),
    (Vec3::new(-8.0, 0.75, 4.0), Vec3::new(6.0, 1.5, 3.0)),
    (Vec3::new(-14.0, 2.0, -2.0), Vec3::new(3.0, 4.0, 3.0)),
];

#[allow(clippy::needless_pass_by_value, clippy::cast_precision_loss)]
pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    settings: Res<Settings>,
) {
    let ground_mat = materials.add(StandardMaterial {
        base_color: Color::srgb(0.35, 0.42, 0.30),
        perceptual_roughness: 0.9,
        ..default()
    });
    let platform_mat = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.52, 0.48),
        perceptual_roughness: 0.8,
        ..default()
    });
    let crate_mat = materials.add(Color::srgb(0.72, 0.52, 0.30));

    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Cuboid::new(GROUND_SIZE, 1.0, GROUND_SIZE)),
            material: ground_mat,
            transform: Transform::from_xyz(0.0, -0.5, 0.0),
            ..default()
        },
        RigidBody::Static,
        Collider::cuboid(GROUND_SIZE, 1.0, GROUND_SIZE),
        Ground,
        Name::new("Ground"),
    ));

    for (center, size) in PLATFORMS {
        commands.spawn((
            PbrBundle {
                mesh: meshes.add(Cuboid::from_size(size)),
                material: platform_mat.clone(),
                transform: Transform::from_translation(center),
                ..default()
            },
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            Ground,
        ));
    }

    let crate_mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    for i in 0..6 {
        let x = -4.0 + (i % 3) as f32 * 1.5;
        let y = 0.5 + (i / 3) as f32 * 1.05;
        commands.spawn((
            PbrBundle {
                mesh: crate_mesh.clone(),
                material: crate_mat.clone(),
                transform: Transform::from_xyz(x, y, -10.0),
                ..default()
            },
            RigidBody::Dynamic,
            Collider::cuboid(1.0, 1.0, 1.0),
        ));
    }

    commands.spawn((
        DirectionalLightBundle {
            directional_light: DirectionalLight {
                shadows_enabled: true,
                illuminance: 8000.0,
                ..default()
            },
            transform: Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        },
        Sun,
    ));
    commands.insert_resource(AmbientLight { color: Color::WHITE, brightness: 300.0 });

    let (radius, length) = PlayerBundle::CAPSULE;
    let mut player = commands.spawn((
        PbrBundle {
            mesh: meshes.add(Capsule3d::new(radius, length)),
            material: materials.add(Color::srgb(0.8, 0.7, 0.6)),
            transform: Transform::from_xyz(0.0, 1.5, 0.0),
            ..default()
        },
        PlayerBundle::new(&settings),
        Name::new("Player"),
    ));
    if let Some(path) = settings.animation.model_path.clone() {
        let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path));
        player.with_children(|p| {
            p.spawn(SceneBundle {
                scene,
                // Model origin at the feet, capsule origin at its center.
                transform: Transform::from_xyz(0.0, -(radius + length * 0.5), 0.0),
                ..default()
            });
        });
    }

    let mut camera = commands.spawn((
        Camera3dBundle::default(),
        OrbitCamera::default(),
        CameraShake::new(0x5eed, &settings.camera),
        Name::new("Follow Camera"),
    ));
    if settings.atmosphere.enabled {
        camera.insert(AtmosphereCamera::default());
    }

    info!("demo scene ready");
}
