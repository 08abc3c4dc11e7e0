use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use bevy_inspector_egui::{prelude::ReflectInspectorOptions, InspectorOptions};

/// Velocity kept per frame by the frame-coupled damping this scene was tuned with.
pub const FRAME_DAMPING: f32 = 0.99995;
/// Frame rate at which [`FRAME_DAMPING`] is converted to a per second rate.
pub const REFERENCE_FPS: f32 = 60.0;

#[derive(Reflect, Resource, InspectorOptions)]
#[reflect(Resource, InspectorOptions)]
pub struct Config {
    #[inspector(min = 1, max = 64)]
    pub count: usize,
    pub spacing: f32,
    pub pivot_height: f32,
    #[inspector(min = 0.5, max = 20.0)]
    pub length: f32,
    pub ball_radius: f32,
    pub gravity: f32,
    /// Fraction of angular velocity kept after one second of swinging
    #[inspector(min = 0.0, max = 1.0)]
    pub damping: f32,
    #[inspector(min = 1, max = 100)]
    pub sub_steps: u32,
    pub max_angle: f32,
    pub drag_button: MouseButton,
    /// Seconds between neighbours following the cursor
    pub drag_stagger: f32,
    /// Seconds between neighbours being released
    pub release_stagger: f32,
    /// Drop pending tasks from earlier gestures when a new one starts
    pub cancel_stale_tasks: bool,
    pub base_frequency: f32,
    pub frequency_step: f32,
    pub amplitude: f32,
    pub show_trails: bool,
    pub trail_duration: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: 12,
            spacing: 1.2,
            pivot_height: 10.0,
            length: 8.0,
            ball_radius: 0.45,
            gravity: 9.81,
            damping: FRAME_DAMPING.powf(REFERENCE_FPS),
            sub_steps: 1,
            max_angle: FRAC_PI_4,
            drag_button: MouseButton::Left,
            drag_stagger: 0.03,
            release_stagger: 0.1,
            cancel_stale_tasks: true,
            base_frequency: 1.0,
            frequency_step: 0.05,
            amplitude: FRAC_PI_4 * 0.5,
            show_trails: false,
            trail_duration: 1.5,
        }
    }
}

impl Config {
    pub fn frequency(&self, index: usize) -> f32 {
        self.base_frequency + self.frequency_step * index as f32
    }

    /// Pivot of the pendulum at `index`, the row is centered on the origin along z.
    pub fn pivot(&self, index: usize) -> Vec3 {
        let offset = (self.count.saturating_sub(1)) as f32 * self.spacing * 0.5;
        Vec3::new(0.0, self.pivot_height, index as f32 * self.spacing - offset)
    }
}

/// Pendulum entities in row order.
#[derive(Reflect, Resource, Default)]
#[reflect(Resource)]
pub struct Pendulums {
    pub list: Vec<Entity>,
}

/// Elapsed time measured from the first frame that asks for it, minus time spent paused.
#[derive(Reflect, Resource, Default)]
#[reflect(Resource)]
pub struct FrameClock {
    pub start: Option<f64>,
    pub paused_at: Option<f64>,
}

impl FrameClock {
    pub fn total(&mut self, now: f64) -> f64 {
        let start = *self.start.get_or_insert(now);
        now - start
    }

    pub fn restart(&mut self) {
        self.start = None;
        self.paused_at = None;
    }

    pub fn pause(&mut self, now: f64) {
        self.paused_at = Some(now);
    }

    /// Pushes the start forward by the time since [`FrameClock::pause`].
    pub fn resume(&mut self, now: f64) {
        let Some(paused_at) = self.paused_at.take() else {
            return;
        };
        if let Some(start) = self.start.as_mut() {
            *start += now - paused_at;
        }
    }
}
