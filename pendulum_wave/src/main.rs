mod components;
mod input;
mod pendulum;
mod resources;
mod state;
mod tasks;
mod trails;

use components::*;
use input::*;
use pendulum::*;
use resources::*;
use state::*;
use trails::*;

use bevy::{
    diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin},
    log::{Level, LogPlugin},
    prelude::*,
};
use bevy_inspector_egui::quick::{ResourceInspectorPlugin, WorldInspectorPlugin};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Pendulum Wave".into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    level: Level::INFO,
                    filter: "wgpu=error,pendulum_wave=debug".into(),
                }),
        )
        .add_plugin(WorldInspectorPlugin::default())
        .add_plugin(FrameTimeDiagnosticsPlugin::default())
        .add_plugin(LogDiagnosticsPlugin::default())
        .insert_resource(ClearColor(Color::rgb(0.05, 0.05, 0.08)))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 0.3,
        })
        .init_resource::<Config>()
        .init_resource::<Pendulums>()
        .init_resource::<FrameClock>()
        .init_resource::<SceneAssets>()
        .add_plugin(ResourceInspectorPlugin::<Config>::default())
        .add_plugin(StatePlugin)
        .add_plugin(DragPlugin)
        .add_plugin(TrailsPlugin)
        .configure_sets(
            (
                PendulumSet::Input,
                PendulumSet::Tasks,
                PendulumSet::Simulate,
                PendulumSet::Sync,
            )
                .chain()
                .in_set(OnUpdate(AppState::Playing)),
        )
        .add_startup_system(setup)
        .add_systems((spawn_ground, spawn_pendulums).in_schedule(OnExit(AppState::Loading)))
        .add_system(spawn_pendulums.in_schedule(OnExit(AppState::Reset)))
        .add_system(
            simulate
                .in_set(PendulumSet::Simulate)
                .run_if(in_state(SimMode::Swing)),
        )
        .add_system(
            update_wave
                .in_set(PendulumSet::Simulate)
                .run_if(in_state(SimMode::Wave)),
        )
        .add_system(sync_visuals.in_set(PendulumSet::Sync))
        .register_type::<Config>()
        .register_type::<Pendulums>()
        .register_type::<FrameClock>()
        .register_type::<Pendulum>()
        .run();
}

/// Per frame order of the pendulum systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendulumSet {
    Input,
    Tasks,
    Simulate,
    Sync,
}

#[derive(Reflect, Resource)]
#[reflect(Resource)]
pub struct SceneAssets {
    pub ground_texture: Handle<Image>,
    pub string_material: Handle<StandardMaterial>,
    pub beam_material: Handle<StandardMaterial>,
}

impl SceneAssets {
    pub const GROUND_TEXTURE: &'static str = "textures/ground.png";
}

impl FromWorld for SceneAssets {
    fn from_world(world: &mut World) -> Self {
        let ground_texture = world.resource::<AssetServer>().load(Self::GROUND_TEXTURE);

        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let string_material = materials.add(StandardMaterial {
            base_color: Color::rgb(0.85, 0.85, 0.8),
            perceptual_roughness: 0.6,
            ..default()
        });
        let beam_material = materials.add(StandardMaterial {
            base_color: Color::rgb(0.3, 0.3, 0.32),
            metallic: 0.8,
            perceptual_roughness: 0.4,
            ..default()
        });

        SceneAssets {
            ground_texture,
            string_material,
            beam_material,
        }
    }
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3dBundle {
            transform: Transform::from_xyz(-16.0, 9.0, 18.0)
                .looking_at(Vec3::new(0.0, 5.0, 0.0), Vec3::Y),
            ..default()
        },
        Name::new("Camera"),
        Keep,
    ));

    // light
    commands.spawn((
        DirectionalLightBundle {
            transform: Transform::from_xyz(20.0, 40.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
            directional_light: DirectionalLight {
                shadows_enabled: true,
                ..default()
            },
            ..default()
        },
        Name::new("Sun"),
        Keep,
    ));

    info!("Loading {}", SceneAssets::GROUND_TEXTURE);
    info!("Drag with the left mouse button, release to swing");
    info!("Press 'Tab' to switch between swing and wave");
    info!("Press 'R' to reset");
    info!("Press 'Space' to pause");
}

fn spawn_ground(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    assets: Res<SceneAssets>,
) {
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Mesh::from(shape::Plane {
                size: 40.,
                ..default()
            })),
            material: materials.add(StandardMaterial {
                base_color_texture: Some(assets.ground_texture.clone()),
                perceptual_roughness: 0.9,
                ..default()
            }),
            ..default()
        },
        Name::new("Ground"),
        Keep,
    ));
}

fn spawn_pendulums(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pendulums: ResMut<Pendulums>,
    assets: Res<SceneAssets>,
    config: Res<Config>,
) {
    pendulums.list.clear();

    let string_mesh = meshes.add(Mesh::from(shape::Box::new(0.04, config.length, 0.04)));
    let ball_mesh = meshes.add(Mesh::from(shape::UVSphere {
        radius: config.ball_radius,
        sectors: 32,
        stacks: 16,
    }));

    for index in 0..config.count {
        let pendulum = Pendulum::new(index, config.frequency(index), config.amplitude);
        let pivot = config.pivot(index);
        let hue = 360.0 * index as f32 / config.count as f32;

        let string = commands
            .spawn((
                PbrBundle {
                    mesh: string_mesh.clone(),
                    material: assets.string_material.clone(),
                    transform: hanging_transform(pivot, pendulum.angle, config.length * 0.5),
                    ..default()
                },
                Name::new(format!("String {}", index)),
            ))
            .id();
        let ball = commands
            .spawn((
                PbrBundle {
                    mesh: ball_mesh.clone(),
                    material: materials.add(StandardMaterial {
                        base_color: Color::hsl(hue, 0.7, 0.5),
                        metallic: 0.3,
                        perceptual_roughness: 0.3,
                        ..default()
                    }),
                    transform: hanging_transform(pivot, pendulum.angle, config.length),
                    ..default()
                },
                Name::new(format!("Ball {}", index)),
            ))
            .id();

        let id = commands
            .spawn((
                pendulum,
                PendulumVisuals {
                    string,
                    ball,
                    pivot,
                    length: config.length,
                },
                Name::new(format!("Pendulum {}", index)),
            ))
            .id();
        pendulums.list.push(id);
    }

    // beam the strings hang from
    let span = config.count.saturating_sub(1) as f32 * config.spacing + 2.0;
    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Mesh::from(shape::Box::new(0.3, 0.3, span))),
            material: assets.beam_material.clone(),
            transform: Transform::from_xyz(0.0, config.pivot_height + 0.15, 0.0),
            ..default()
        },
        Name::new("Beam"),
    ));

    info!("Spawned {} pendulums", config.count);
}

// length is fixed at spawn, a later config edit only takes effect after reset
fn simulate(
    time: Res<Time>,
    config: Res<Config>,
    mut query: Query<(&mut Pendulum, &PendulumVisuals)>,
) {
    let now = time.elapsed_seconds_f64();
    for (mut pendulum, visuals) in query.iter_mut().filter(|(p, _)| p.is_swinging()) {
        pendulum.step(now, visuals.length, &config);
    }
}

fn update_wave(time: Res<Time>, mut clock: ResMut<FrameClock>, mut query: Query<&mut Pendulum>) {
    let total = clock.total(time.elapsed_seconds_f64()) as f32;
    for mut pendulum in query.iter_mut() {
        pendulum.update_wave(total);
    }
}

fn sync_visuals(
    pendulums: Query<(&Pendulum, &PendulumVisuals), Changed<Pendulum>>,
    mut transforms: Query<&mut Transform>,
) {
    for (pendulum, visuals) in pendulums.iter() {
        if let Ok(mut trans) = transforms.get_mut(visuals.string) {
            *trans = hanging_transform(visuals.pivot, pendulum.angle, visuals.string_drop());
        }
        if let Ok(mut trans) = transforms.get_mut(visuals.ball) {
            *trans = hanging_transform(visuals.pivot, pendulum.angle, visuals.ball_drop());
        }
    }
}
