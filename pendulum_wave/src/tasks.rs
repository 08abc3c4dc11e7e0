use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskAction {
    SetAngle { x: f32, width: f32 },
    StartSwinging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Task {
    pub due: f64,
    pub target: Entity,
    pub action: TaskAction,
    pub generation: u64,
}

/// Per pendulum work deferred by a stagger delay.
///
/// Each press of the drag button starts a new gesture that lasts through its release.
/// Tasks remember the gesture they were scheduled in so a later press can drop them.
#[derive(Resource, Default, Debug)]
pub struct StaggeredTasks {
    generation: u64,
    pending: Vec<Task>,
}

impl StaggeredTasks {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn begin_gesture(&mut self, cancel_stale: bool) {
        self.generation += 1;
        if cancel_stale {
            let current = self.generation;
            self.pending.retain(|task| task.generation == current);
        }
    }

    pub fn schedule(&mut self, due: f64, target: Entity, action: TaskAction) {
        self.pending.push(Task {
            due,
            target,
            action,
            generation: self.generation,
        });
    }

    /// One task per entity, the one at `index` delayed by `index * stagger` seconds.
    pub fn schedule_staggered(
        &mut self,
        now: f64,
        stagger: f32,
        targets: &[Entity],
        action: TaskAction,
    ) {
        for (index, target) in targets.iter().enumerate() {
            let due = now + index as f64 * stagger as f64;
            self.schedule(due, *target, action);
        }
    }

    /// Removes every task due by `now`, earliest first. Equal due times keep scheduling order.
    pub fn take_due(&mut self, now: f64) -> Vec<Task> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|task| task.due <= now);
        self.pending = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
