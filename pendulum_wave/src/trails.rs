use bevy::{prelude::*, utils::HashMap};
use bevy_prototype_debug_lines::{DebugLines, DebugLinesPlugin};

use crate::{components::PendulumVisuals, resources::Config, PendulumSet};

pub struct TrailsPlugin;

impl Plugin for TrailsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(DebugLinesPlugin::default())
            .add_system(draw_trails.after(PendulumSet::Sync));
    }
}

fn draw_trails(
    config: Res<Config>,
    mut lines: ResMut<DebugLines>,
    pendulums: Query<&PendulumVisuals>,
    balls: Query<&Transform>,
    mut last_pos: Local<HashMap<Entity, Vec3>>,
) {
    if !config.show_trails {
        last_pos.clear();
        return;
    }

    // drop balls despawned by a reset
    last_pos.retain(|e, _| balls.contains(*e));

    for visuals in pendulums.iter() {
        let Ok(trans) = balls.get(visuals.ball) else {
            continue;
        };
        if let Some(pos) = last_pos.insert(visuals.ball, trans.translation) {
            lines.line_colored(pos, trans.translation, config.trail_duration, Color::RED);
        }
    }
}
