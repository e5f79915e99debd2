//! One self-contained simulation instance: the ECS world plus its schedule.
//!
//! `Simulation` owns all of its state and does no internal locking. A host
//! that drives it from one thread and issues control calls from another must
//! serialize access itself, e.g. behind a single `Mutex<Simulation>`.

use bevy_ecs::prelude::{Schedule, World};

use crate::clock::SimulationClock;
use crate::control;
use crate::demand::ArrivalProcess;
use crate::ecs::{Request, VehicleId};
use crate::error::ControlResult;
use crate::fleet::{FleetRegistry, Vehicle};
use crate::runner::{run_next_event, run_until_time, simulation_schedule};
use crate::scenario::{build_scenario, DispatchConfig, ScenarioParams};
use crate::telemetry::{collect_stats, CompletedRequestRecord, DispatchTelemetry, SimStats};

pub struct Simulation {
    world: World,
    schedule: Schedule,
    /// Simulated time covered so far: the furthest `run_until` bound reached.
    /// The clock itself only lands on event times and may lag behind.
    horizon: u64,
}

impl Simulation {
    pub fn new(params: &ScenarioParams) -> ControlResult<Self> {
        let mut world = World::new();
        build_scenario(&mut world, params)?;
        Ok(Self {
            world,
            schedule: simulation_schedule(),
            horizon: 0,
        })
    }

    /// Process exactly one event and run one dispatch pass.
    /// Returns `false` without doing anything if the queue is empty.
    pub fn step(&mut self) -> bool {
        let stepped = run_next_event(&mut self.world, &mut self.schedule);
        self.horizon = self.horizon.max(self.now());
        stepped
    }

    /// Step while events remain before `end_ms`. Returns the steps taken.
    pub fn run_until(&mut self, end_ms: u64) -> usize {
        let steps = run_until_time(&mut self.world, &mut self.schedule, end_ms);
        self.horizon = self.horizon.max(end_ms).max(self.now());
        steps
    }

    /// Step through the next `duration_ms` of simulated time, starting where
    /// the previous run ended. Back-to-back calls cover contiguous slices.
    pub fn run_for(&mut self, duration_ms: u64) -> usize {
        let end = self.horizon().saturating_add(duration_ms);
        self.run_until(end)
    }

    /// End of the simulated time covered so far. Never behind [Self::now].
    pub fn horizon(&self) -> u64 {
        self.horizon.max(self.now())
    }

    pub fn stats(&self) -> SimStats {
        collect_stats(&self.world)
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.world.resource::<SimulationClock>().next_event_time()
    }

    pub fn config(&self) -> DispatchConfig {
        *self.world.resource::<DispatchConfig>()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        self.world.resource::<FleetRegistry>().vehicles()
    }

    /// Every request created so far, in id order.
    pub fn requests(&self) -> Vec<Request> {
        let mut requests: Vec<Request> = self
            .world
            .iter_entities()
            .filter_map(|e| e.get::<Request>().copied())
            .collect();
        requests.sort_by_key(|r| r.id);
        requests
    }

    pub fn completed_requests(&self) -> &[CompletedRequestRecord] {
        &self.telemetry().completed_requests
    }

    pub fn telemetry(&self) -> &DispatchTelemetry {
        self.world.resource::<DispatchTelemetry>()
    }

    pub fn add_vehicle(&mut self) -> VehicleId {
        control::add_vehicle(&mut self.world)
    }

    pub fn add_vehicle_with_speed(&mut self, speed: f64) -> ControlResult<VehicleId> {
        control::add_vehicle_with_speed(&mut self.world, speed)
    }

    pub fn remove_idle_vehicle(&mut self) -> ControlResult<VehicleId> {
        control::remove_idle_vehicle(&mut self.world)
    }

    pub fn set_arrival_rate(&mut self, per_minute: f64) -> ControlResult<()> {
        control::set_arrival_rate(&mut self.world, per_minute)
    }

    pub fn set_vehicle_speed(&mut self, speed: f64) -> ControlResult<()> {
        control::set_vehicle_speed(&mut self.world, speed)
    }

    pub fn set_arrival_process(&mut self, process: ArrivalProcess) {
        control::set_arrival_process(&mut self.world, process)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
