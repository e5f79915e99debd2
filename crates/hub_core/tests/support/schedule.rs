#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use hub_core::clock::Event;
use hub_core::runner::{
    run_next_event, run_next_event_with_hook, run_steps, run_until_time, simulation_schedule,
};
use hub_core::systems::dispatch::dispatch_system;

/// Helper that owns a reusable `Schedule` so tests can step a world directly.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    /// Create a runner with the default dispatch schedule.
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    /// Run a single event and hand it to `hook` afterwards.
    pub fn run_one_with_hook<F>(&mut self, world: &mut World, hook: F) -> bool
    where
        F: FnMut(&World, &Event),
    {
        run_next_event_with_hook(world, &mut self.schedule, hook)
    }

    /// Run up to `max_steps` events, returning the number executed.
    pub fn run_steps(&mut self, world: &mut World, max_steps: usize) -> usize {
        run_steps(world, &mut self.schedule, max_steps)
    }

    /// Run one dispatch pass at the current time without popping an event.
    pub fn dispatch_now(&mut self, world: &mut World) {
        let mut pass = Schedule::default();
        pass.add_systems(dispatch_system);
        pass.run(world);
    }

    /// Run every event strictly before `end_ms`.
    pub fn run_until(&mut self, world: &mut World, end_ms: u64) -> usize {
        run_until_time(world, &mut self.schedule, end_ms)
    }
}
