#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, World};
use hub_core::clock::SimulationClock;
use hub_core::demand::{ArrivalProcess, DemandGenerator};
use hub_core::ecs::{Direction, Pending, Request, RequestId};
use hub_core::fleet::FleetRegistry;
use hub_core::scenario::{build_scenario, DispatchConfig, ScenarioParams};
use hub_core::telemetry::DispatchTelemetry;

/// Builder for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldBuilder {
    params: ScenarioParams,
    with_arrivals: bool,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            params: ScenarioParams::default().with_seed(42),
            with_arrivals: true,
        }
    }
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params = self.params.with_seed(seed);
        self
    }

    pub fn with_fleet_size(mut self, fleet_size: usize) -> Self {
        self.params = self.params.with_fleet_size(fleet_size);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.params = self.params.with_speed(speed);
        self
    }

    pub fn with_service_radius(mut self, radius: f64) -> Self {
        self.params = self.params.with_service_radius(radius);
        self
    }

    pub fn with_arrival_rate(mut self, per_minute: f64) -> Self {
        self.params = self.params.with_arrival_rate(per_minute);
        self
    }

    pub fn with_arrival_process(mut self, process: ArrivalProcess) -> Self {
        self.params = self.params.with_arrival_process(process);
        self
    }

    /// Build a world with no arrival chain: only hand-injected requests exist.
    pub fn without_arrivals(mut self) -> Self {
        self.with_arrivals = false;
        self
    }

    pub fn params(&self) -> &ScenarioParams {
        &self.params
    }

    pub fn build(self) -> World {
        let mut world = World::new();
        if self.with_arrivals {
            build_scenario(&mut world, &self.params).expect("valid test scenario");
            return world;
        }

        let config = DispatchConfig::from_params(&self.params).expect("valid test scenario");
        let mut fleet = FleetRegistry::default();
        for _ in 0..self.params.initial_fleet_size {
            fleet.add_vehicle(config.vehicle_speed, 0);
        }
        world.insert_resource(SimulationClock::default());
        world.insert_resource(config);
        world.insert_resource(fleet);
        world.insert_resource(DemandGenerator::new(self.params.seed.unwrap_or(42)));
        world.insert_resource(DispatchTelemetry::default());
        world
    }
}

/// Spawn a pending request created at `created_at`, bypassing the generator.
pub fn spawn_request(
    world: &mut World,
    id: u64,
    created_at: u64,
    pickup_distance: f64,
    direction: Direction,
) -> Entity {
    world.resource_mut::<DispatchTelemetry>().record_arrival();
    world
        .spawn((
            Request::new(RequestId(id), created_at, pickup_distance, direction),
            Pending,
        ))
        .id()
}
