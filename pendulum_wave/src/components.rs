use bevy::prelude::*;

/// The string and ball entities a pendulum drives, both hung from `pivot`.
#[derive(Component, Debug)]
pub struct PendulumVisuals {
    pub string: Entity,
    pub ball: Entity,
    pub pivot: Vec3,
    pub length: f32,
}

impl PendulumVisuals {
    /// The string mesh is centered, so it hangs half its length below the pivot.
    pub fn string_drop(&self) -> f32 {
        self.length * 0.5
    }

    pub fn ball_drop(&self) -> f32 {
        self.length
    }
}
