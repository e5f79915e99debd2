use bevy_ecs::prelude::World;
use log::info;

use crate::clock::SimulationClock;
use crate::demand::DemandGenerator;
use crate::error::ControlResult;
use crate::fleet::FleetRegistry;
use crate::scenario::params::{DispatchConfig, ScenarioParams};
use crate::telemetry::DispatchTelemetry;

/// Populate `world` with every resource the dispatch schedule needs and
/// start the arrival chain. Parameters are validated before anything is
/// inserted, so a rejected scenario leaves the world untouched.
pub fn build_scenario(world: &mut World, params: &ScenarioParams) -> ControlResult<()> {
    let config = DispatchConfig::from_params(params)?;
    let seed = params.seed.unwrap_or_else(rand::random);

    let mut clock = SimulationClock::default();
    let mut fleet = FleetRegistry::default();
    for _ in 0..params.initial_fleet_size {
        fleet.add_vehicle(config.vehicle_speed, clock.now());
    }

    let mut demand = DemandGenerator::new(seed);
    demand.schedule_next_arrival(&mut clock, &config);

    info!(
        "scenario: {} vehicles, radius {}, {:.1} req/min ({:?}), seed {seed}",
        params.initial_fleet_size,
        config.service_radius,
        config.arrival_rate_per_minute,
        config.arrival_process,
    );

    world.insert_resource(clock);
    world.insert_resource(config);
    world.insert_resource(fleet);
    world.insert_resource(demand);
    world.insert_resource(DispatchTelemetry::default());
    Ok(())
}
