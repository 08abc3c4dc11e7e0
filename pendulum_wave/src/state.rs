use bevy::{app::AppExit, asset::LoadState, prelude::*};
use bevy_prototype_debug_lines::DebugLinesMesh;

use crate::{
    input::DragState,
    pendulum::Pendulum,
    resources::{FrameClock, Pendulums},
    tasks::StaggeredTasks,
    SceneAssets,
};

const KEY_RESET: KeyCode = KeyCode::R;
const KEY_PAUSE: KeyCode = KeyCode::Space;
const KEY_MODE: KeyCode = KeyCode::Tab;

pub struct StatePlugin;

impl Plugin for StatePlugin {
    fn build(&self, app: &mut App) {
        app.add_state::<AppState>()
            .add_state::<SimMode>()
            .add_system(load_listen.in_set(OnUpdate(AppState::Loading)))
            .add_system(keyboard_listen)
            .add_system(pause_clocks.in_schedule(OnEnter(AppState::Pause)))
            .add_system(resume_clocks.in_schedule(OnExit(AppState::Pause)))
            .add_system(reset.in_set(OnUpdate(AppState::Reset)))
            .add_system(enter_wave.in_schedule(OnEnter(SimMode::Wave)))
            .add_system(enter_swing.in_schedule(OnEnter(SimMode::Swing)));
    }
}

#[derive(States, PartialEq, Eq, Debug, Clone, Hash, Default)]
pub enum AppState {
    #[default]
    Loading,
    Playing,
    Pause,
    Reset,
}

/// How the row is driven: released pendulums under gravity, or the closed form wave.
#[derive(States, PartialEq, Eq, Debug, Clone, Hash, Default)]
pub enum SimMode {
    #[default]
    Swing,
    Wave,
}

#[derive(Component)]
pub struct Keep;

fn load_listen(
    assets: Res<SceneAssets>,
    asset_server: Res<AssetServer>,
    mut app_state: ResMut<NextState<AppState>>,
    mut exit: EventWriter<AppExit>,
) {
    match asset_server.get_load_state(&assets.ground_texture) {
        LoadState::Loaded => {
            info!("Loading done");
            app_state.set(AppState::Playing);
        }
        LoadState::Failed => {
            error!("failed to load {}", SceneAssets::GROUND_TEXTURE);
            exit.send(AppExit);
        }
        _ => {}
    }
}

fn reset(
    mut commands: Commands,
    query: Query<
        Entity,
        (
            Without<Keep>,
            Without<Window>,
            Without<Parent>,
            Without<DebugLinesMesh>,
        ),
    >,
    mut pendulums: ResMut<Pendulums>,
    mut tasks: ResMut<StaggeredTasks>,
    mut clock: ResMut<FrameClock>,
    mut app_state: ResMut<NextState<AppState>>,
) {
    for e in query.iter() {
        commands.entity(e).despawn();
    }
    pendulums.list.clear();
    tasks.clear();
    clock.restart();
    app_state.set(AppState::Playing);
}

/// Space toggles pause; R and Tab only act while playing.
fn keyboard_listen(
    keys: Res<Input<KeyCode>>,
    app_state: Res<State<AppState>>,
    mode: Res<State<SimMode>>,
    mut next_app_state: ResMut<NextState<AppState>>,
    mut next_mode: ResMut<NextState<SimMode>>,
) {
    if keys.just_pressed(KEY_PAUSE) {
        match app_state.0 {
            AppState::Playing => {
                info!("Pause");
                next_app_state.set(AppState::Pause);
            }
            AppState::Pause => {
                info!("Resume");
                next_app_state.set(AppState::Playing);
            }
            _ => {}
        }
        return;
    }
    if app_state.0 != AppState::Playing {
        return;
    }

    if keys.just_pressed(KEY_RESET) {
        info!("Reset");
        next_app_state.set(AppState::Reset);
    } else if keys.just_pressed(KEY_MODE) {
        let next = match mode.0 {
            SimMode::Swing => SimMode::Wave,
            SimMode::Wave => SimMode::Swing,
        };
        info!("Mode {:?}", next);
        next_mode.set(next);
    }
}

fn pause_clocks(time: Res<Time>, mut clock: ResMut<FrameClock>) {
    clock.pause(time.elapsed_seconds_f64());
}

// time kept running while paused, neither the wave nor the swing may see it
fn resume_clocks(
    time: Res<Time>,
    mut clock: ResMut<FrameClock>,
    mut query: Query<&mut Pendulum>,
) {
    let now = time.elapsed_seconds_f64();
    clock.resume(now);
    for mut pendulum in query.iter_mut().filter(|p| p.is_swinging()) {
        pendulum.resume(now);
    }
}

fn enter_wave(
    mut tasks: ResMut<StaggeredTasks>,
    mut clock: ResMut<FrameClock>,
    mut drag_next_state: ResMut<NextState<DragState>>,
    mut query: Query<&mut Pendulum>,
) {
    debug!("dropping {} pending tasks", tasks.len());
    tasks.clear();
    clock.restart();
    drag_next_state.set(DragState::Released);
    for mut pendulum in query.iter_mut() {
        pendulum.stop_swinging();
    }
}

fn enter_swing(
    time: Res<Time>,
    mut tasks: ResMut<StaggeredTasks>,
    mut query: Query<&mut Pendulum>,
) {
    tasks.clear();
    let now = time.elapsed_seconds_f64();
    for mut pendulum in query.iter_mut() {
        pendulum.start_swinging(now);
    }
}

#[cfg(test)]
mod tests {
    use bevy::utils::Duration;

    use super::*;
    use crate::tasks::TaskAction;

    const DT: f64 = 1.0 / 60.0;

    /// Everything but loading and reset, which need the asset server.
    fn state_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<Input<KeyCode>>()
            .init_resource::<StaggeredTasks>()
            .init_resource::<FrameClock>()
            .add_state::<AppState>()
            .add_state::<SimMode>()
            .add_state::<DragState>()
            .add_system(keyboard_listen)
            .add_system(pause_clocks.in_schedule(OnEnter(AppState::Pause)))
            .add_system(resume_clocks.in_schedule(OnExit(AppState::Pause)))
            .add_system(enter_wave.in_schedule(OnEnter(SimMode::Wave)))
            .add_system(enter_swing.in_schedule(OnEnter(SimMode::Swing)));
        app.world
            .resource_mut::<NextState<AppState>>()
            .set(AppState::Playing);
        app
    }

    fn frame(app: &mut App, at: f64) {
        let mut time = app.world.resource_mut::<Time>();
        let startup = time.startup();
        time.update_with_instant(startup + Duration::from_secs_f64(at));
        app.update();
        app.world.resource_mut::<Input<KeyCode>>().clear();
    }

    fn tap(app: &mut App, key: KeyCode) {
        let mut keys = app.world.resource_mut::<Input<KeyCode>>();
        keys.press(key);
        keys.release(key);
    }

    fn now(app: &App) -> f64 {
        app.world.resource::<Time>().elapsed_seconds_f64()
    }

    fn spawn_swinging(app: &mut App, count: usize) -> Vec<Entity> {
        (0..count)
            .map(|i| {
                let mut pendulum = Pendulum::new(i, 1.0, 0.2);
                pendulum.angle = 0.3;
                pendulum.start_swinging(0.0);
                app.world.spawn(pendulum).id()
            })
            .collect()
    }

    #[test]
    fn entering_wave_stops_swinging_and_drops_tasks() {
        let mut app = state_app();
        let mut t = 0.0;
        frame(&mut app, t);
        let pendulums = spawn_swinging(&mut app, 3);
        app.world.resource_mut::<StaggeredTasks>().schedule(
            100.0,
            pendulums[0],
            TaskAction::StartSwinging,
        );
        app.world.resource_mut::<FrameClock>().total(0.0);

        tap(&mut app, KEY_MODE);
        t += DT;
        frame(&mut app, t);
        t += DT;
        frame(&mut app, t);

        assert_eq!(app.world.resource::<State<SimMode>>().0, SimMode::Wave);
        assert!(app.world.resource::<StaggeredTasks>().is_empty());
        assert_eq!(app.world.resource::<FrameClock>().start, None);
        for e in pendulums {
            assert!(!app.world.get::<Pendulum>(e).unwrap().is_swinging());
        }
    }

    #[test]
    fn entering_swing_releases_from_wave_angle() {
        let mut app = state_app();
        let mut t = 0.0;
        frame(&mut app, t);
        let pendulums = spawn_swinging(&mut app, 2);

        tap(&mut app, KEY_MODE);
        for _ in 0..2 {
            t += DT;
            frame(&mut app, t);
        }
        for e in &pendulums {
            let mut pendulum = app.world.get_mut::<Pendulum>(*e).unwrap();
            pendulum.angle = -0.2;
            pendulum.velocity = 1.5;
        }

        tap(&mut app, KEY_MODE);
        for _ in 0..2 {
            t += DT;
            frame(&mut app, t);
        }

        assert_eq!(app.world.resource::<State<SimMode>>().0, SimMode::Swing);
        for e in pendulums {
            let pendulum = app.world.get::<Pendulum>(e).unwrap();
            assert!(pendulum.is_swinging());
            assert_eq!(pendulum.angle, -0.2);
            assert_eq!(pendulum.velocity, 0.0);
            assert_eq!(pendulum.last_update, now(&app));
        }
    }

    #[test]
    fn paused_time_reaches_neither_clock() {
        let mut app = state_app();
        let mut t = 0.0;
        frame(&mut app, t);
        let pendulum = spawn_swinging(&mut app, 1)[0];
        let start = now(&app);
        app.world.resource_mut::<FrameClock>().total(start);

        t += 1.0;
        tap(&mut app, KEY_PAUSE);
        frame(&mut app, t);
        t += DT;
        frame(&mut app, t);
        assert_eq!(app.world.resource::<State<AppState>>().0, AppState::Pause);
        let paused_at = now(&app);

        // R and Tab do nothing while paused
        t += 5.0;
        tap(&mut app, KEY_RESET);
        frame(&mut app, t);
        tap(&mut app, KEY_MODE);
        t += DT;
        frame(&mut app, t);
        assert_eq!(app.world.resource::<State<AppState>>().0, AppState::Pause);
        assert_eq!(app.world.resource::<State<SimMode>>().0, SimMode::Swing);

        tap(&mut app, KEY_PAUSE);
        t += DT;
        frame(&mut app, t);
        t += DT;
        frame(&mut app, t);
        assert_eq!(app.world.resource::<State<AppState>>().0, AppState::Playing);
        let resumed_at = now(&app);

        let total = app.world.resource_mut::<FrameClock>().total(resumed_at);
        assert!((total - (paused_at - start)).abs() < 1e-9, "total {total}");
        let pendulum = app.world.get::<Pendulum>(pendulum).unwrap();
        assert_eq!(pendulum.last_update, resumed_at);
    }

    #[test]
    fn reset_key_requests_reset() {
        let mut app = state_app();
        frame(&mut app, 0.0);
        tap(&mut app, KEY_RESET);
        frame(&mut app, DT);
        frame(&mut app, 2.0 * DT);
        assert_eq!(app.world.resource::<State<AppState>>().0, AppState::Reset);
    }
}
