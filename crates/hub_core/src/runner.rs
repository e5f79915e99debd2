//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule: the arrival or completion system
//! (whichever matches the event), a deferred-command flush so newly spawned
//! requests exist, one dispatch pass, and a second flush so assigned
//! requests leave the backlog query.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, ExecutorKind, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::systems::{
    arrival::arrival_system, completion::completion_system, dispatch::dispatch_system,
};

fn is_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Arrival)
        .unwrap_or(false)
}

fn is_completion(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Completion)
        .unwrap_or(false)
}

/// Runs one simulation step. Returns `true` if an event was processed,
/// `false` if the queue was empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    run_next_event_with_hook(world, schedule, |_, _| {})
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    hook(world, &event);
    true
}

/// Steps while the queue is non-empty and the next event falls before
/// `end_ms`. The clock never passes `end_ms`. Returns the number of steps.
pub fn run_until_time(world: &mut World, schedule: &mut Schedule, end_ms: u64) -> usize {
    let mut steps = 0;
    loop {
        let next = world.resource::<SimulationClock>().next_event_time();
        match next {
            Some(ts) if ts < end_ms => {}
            _ => break,
        }
        if !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Runs simulation steps until the event queue is empty or `max_steps` is reached.
/// The arrival chain never ends on its own, so `max_steps` is the real bound.
pub fn run_steps(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Builds the dispatch schedule. Runs single-threaded: a step is atomic and
/// its systems execute strictly in the chained order.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            arrival_system.run_if(is_arrival),
            completion_system.run_if(is_completion),
            // Spawned requests must be visible to the dispatch pass.
            apply_deferred,
            dispatch_system,
            // Assigned requests drop their `Pending` marker before the next step.
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{build_scenario, ScenarioParams};
    use crate::telemetry::DispatchTelemetry;

    #[test]
    fn run_until_time_stops_before_end() {
        let mut world = World::new();
        build_scenario(&mut world, &ScenarioParams::default().with_seed(11)).expect("scenario");
        let mut schedule = simulation_schedule();

        let steps = run_until_time(&mut world, &mut schedule, 60_000);
        assert!(steps > 0);
        let clock = world.resource::<SimulationClock>();
        assert!(clock.now() < 60_000);
        assert!(clock.next_event_time().expect("arrival chain") >= 60_000);
    }

    #[test]
    fn hook_sees_every_completion() {
        let mut world = World::new();
        build_scenario(
            &mut world,
            &ScenarioParams::default().with_seed(5).with_fleet_size(3),
        )
        .expect("scenario");
        let mut schedule = simulation_schedule();

        let mut completions = 0u64;
        for _ in 0..2_000 {
            run_next_event_with_hook(&mut world, &mut schedule, |_, event| {
                if event.kind == EventKind::Completion {
                    completions += 1;
                }
            });
        }
        assert!(completions > 0);
        assert_eq!(world.resource::<DispatchTelemetry>().completed_count, completions);
    }
}
