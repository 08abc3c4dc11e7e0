use bevy::prelude::*;

use crate::{
    pendulum::Pendulum,
    resources::{Config, Pendulums},
    state::SimMode,
    tasks::{StaggeredTasks, TaskAction},
    PendulumSet,
};

pub struct DragPlugin;

impl Plugin for DragPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StaggeredTasks>()
            .add_state::<DragState>()
            .add_system(
                handle_drag_none
                    .in_set(OnUpdate(DragState::Released))
                    .in_set(PendulumSet::Input)
                    .run_if(in_state(SimMode::Swing)),
            )
            .add_system(handle_drag_start.in_schedule(OnEnter(DragState::Dragging)))
            .add_system(
                handle_drag_move
                    .in_set(OnUpdate(DragState::Dragging))
                    .in_set(PendulumSet::Input),
            )
            .add_system(handle_drag_end.in_schedule(OnExit(DragState::Dragging)))
            .add_system(
                run_due_tasks
                    .in_set(PendulumSet::Tasks)
                    .run_if(in_state(SimMode::Swing)),
            );
    }
}

#[derive(States, PartialEq, Eq, Debug, Clone, Hash, Default)]
pub enum DragState {
    #[default]
    Released,
    Dragging,
}

/// Cursor x and window width, `None` when the cursor is outside the window.
fn cursor(window_query: &Query<&Window>) -> Option<(f32, f32)> {
    let window = window_query.get_single().ok()?;
    let pos = window.cursor_position()?;
    Some((pos.x, window.width()))
}

/// Stops a pendulum for dragging and snaps it to the cursor when there is one.
pub fn grab(pendulum: &mut Pendulum, cursor: Option<(f32, f32)>, max_angle: f32) {
    pendulum.stop_swinging();
    if let Some((x, width)) = cursor {
        pendulum.set_angle_from_cursor(x, width, max_angle);
    }
}

pub fn apply_task(pendulum: &mut Pendulum, action: TaskAction, now: f64, max_angle: f32) {
    match action {
        TaskAction::SetAngle { x, width } => pendulum.set_angle_from_cursor(x, width, max_angle),
        TaskAction::StartSwinging => pendulum.start_swinging(now),
    }
}

fn handle_drag_none(
    config: Res<Config>,
    mouse_input: Res<Input<MouseButton>>,
    mut drag_next_state: ResMut<NextState<DragState>>,
) {
    if mouse_input.just_pressed(config.drag_button) {
        drag_next_state.set(DragState::Dragging);
    }
}

fn handle_drag_start(
    config: Res<Config>,
    window_query: Query<&Window>,
    mut tasks: ResMut<StaggeredTasks>,
    mut query: Query<&mut Pendulum>,
) {
    tasks.begin_gesture(config.cancel_stale_tasks);

    debug!("drag gesture {}", tasks.generation());

    let cursor = cursor(&window_query);
    if cursor.is_none() {
        debug!("drag started without a cursor, holding current angles");
    }
    for mut pendulum in query.iter_mut() {
        grab(&mut pendulum, cursor, config.max_angle);
    }
}

fn handle_drag_move(
    config: Res<Config>,
    time: Res<Time>,
    pendulums: Res<Pendulums>,
    mouse_input: Res<Input<MouseButton>>,
    window_query: Query<&Window>,
    mut tasks: ResMut<StaggeredTasks>,
    mut drag_next_state: ResMut<NextState<DragState>>,
) {
    if !mouse_input.pressed(config.drag_button) {
        drag_next_state.set(DragState::Released);
        return;
    }

    let Some((x, width)) = cursor(&window_query) else {
        return;
    };
    tasks.schedule_staggered(
        time.elapsed_seconds_f64(),
        config.drag_stagger,
        &pendulums.list,
        TaskAction::SetAngle { x, width },
    );
}

fn handle_drag_end(
    config: Res<Config>,
    time: Res<Time>,
    pendulums: Res<Pendulums>,
    mode: Res<State<SimMode>>,
    mut tasks: ResMut<StaggeredTasks>,
) {
    if mode.0 != SimMode::Swing {
        return;
    }

    // same gesture as the drag: its trailing set-angle tasks are due before these starts
    tasks.schedule_staggered(
        time.elapsed_seconds_f64(),
        config.release_stagger,
        &pendulums.list,
        TaskAction::StartSwinging,
    );
    debug!("released {} pendulums", pendulums.list.len());
}

fn run_due_tasks(
    config: Res<Config>,
    time: Res<Time>,
    mut tasks: ResMut<StaggeredTasks>,
    mut query: Query<&mut Pendulum>,
) {
    let now = time.elapsed_seconds_f64();
    for task in tasks.take_due(now) {
        // target may be gone after a reset
        let Ok(mut pendulum) = query.get_mut(task.target) else {
            continue;
        };
        apply_task(&mut pendulum, task.action, now, config.max_angle);
    }
}
