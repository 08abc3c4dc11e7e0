use bevy::prelude::*;

use crate::resources::Config;

/// Angular state of one pendulum in the row.
#[derive(Reflect, Component, Default, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct Pendulum {
    pub index: usize,
    pub angle: f32,
    pub velocity: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub swinging: bool,
    pub last_update: f64,
}

impl Pendulum {
    pub fn new(index: usize, frequency: f32, amplitude: f32) -> Self {
        Self {
            index,
            frequency,
            amplitude,
            ..default()
        }
    }

    pub fn is_swinging(&self) -> bool {
        self.swinging
    }

    /// Closed form wave position, depends only on `total` seconds.
    pub fn update_wave(&mut self, total: f32) {
        self.angle = self.amplitude * (self.frequency * total).cos();
    }

    pub fn start_swinging(&mut self, now: f64) {
        self.swinging = true;
        self.velocity = 0.0;
        self.last_update = now;
    }

    pub fn stop_swinging(&mut self) {
        self.swinging = false;
    }

    /// Restart the integration clock without touching the motion state.
    pub fn resume(&mut self, now: f64) {
        self.last_update = now;
    }

    pub fn set_angle_from_cursor(&mut self, x: f32, width: f32, max_angle: f32) {
        self.angle = angle_from_cursor(x, width, max_angle);
    }

    /// Semi-implicit Euler up to `now` for a string of `length`, split into `config.sub_steps`.
    pub fn step(&mut self, now: f64, length: f32, config: &Config) {
        if !self.swinging {
            return;
        }
        let dt = (now - self.last_update) as f32;
        self.last_update = now;

        // zero time has nothing to integrate
        if dt <= 0.0 {
            return;
        }

        let sub_steps = config.sub_steps.max(1);
        let sdt = dt / sub_steps as f32;
        let stiffness = config.gravity / length;
        let keep = config.damping.powf(sdt);
        for _ in 0..sub_steps {
            let acceleration = -stiffness * self.angle.sin();
            self.velocity += acceleration * sdt;
            self.angle += self.velocity * sdt;
            self.velocity *= keep;
        }
    }
}

/// Maps the horizontal cursor offset from the window center onto `[-max_angle, max_angle]`.
/// Not clamped, a cursor outside the window keeps scaling linearly.
pub fn angle_from_cursor(x: f32, width: f32, max_angle: f32) -> f32 {
    let center = width * 0.5;
    (x - center) / center * max_angle
}

/// Transform of a part hanging `drop` below `pivot` when rotated by `angle` around z.
pub fn hanging_transform(pivot: Vec3, angle: f32, drop: f32) -> Transform {
    let rotation = Quat::from_rotation_z(angle);
    Transform {
        translation: pivot + rotation * Vec3::new(0.0, -drop, 0.0),
        rotation,
        ..default()
    }
}
