//! Test helpers for common test setup and utilities.

use bevy_ecs::prelude::{Entity, World};

use crate::clock::SimulationClock;
use crate::demand::DemandGenerator;
use crate::ecs::{Direction, Pending, Request, RequestId};
use crate::fleet::FleetRegistry;
use crate::scenario::{DispatchConfig, ScenarioParams};
use crate::telemetry::DispatchTelemetry;

/// Create a minimal test world: every resource the systems read, default
/// configuration, an empty fleet, and no arrival scheduled.
///
/// For a fully populated world use `build_scenario`.
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    // Default params always validate.
    let config = DispatchConfig::from_params(&ScenarioParams::default())
        .unwrap_or_else(|err| panic!("default params rejected: {err}"));
    world.insert_resource(config);
    world.insert_resource(FleetRegistry::default());
    world.insert_resource(DemandGenerator::new(42));
    world.insert_resource(DispatchTelemetry::default());
    world
}

/// Spawn a pending request directly, bypassing the demand generator. Counts
/// it in the backlog the way an arrival would.
pub fn spawn_pending_request(
    world: &mut World,
    id: u64,
    created_at: u64,
    pickup_distance: f64,
) -> Entity {
    world.resource_mut::<DispatchTelemetry>().record_arrival();
    world
        .spawn((
            Request::new(RequestId(id), created_at, pickup_distance, Direction::ToHub),
            Pending,
        ))
        .id()
}
