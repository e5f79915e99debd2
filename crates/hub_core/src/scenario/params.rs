use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::demand::ArrivalProcess;
use crate::error::{validate_radius, validate_rate, validate_speed, ControlResult};

/// Default service radius around the hub (km).
const DEFAULT_SERVICE_RADIUS: f64 = 3.0;

const DEFAULT_FLEET_SIZE: usize = 25;

/// Default vehicle speed: 25 km/h expressed in km per simulated second.
const DEFAULT_SPEED_KMH: f64 = 25.0;

const DEFAULT_ARRIVAL_RATE_PER_MINUTE: f64 = 100.0;

pub fn kmh_to_per_sec(kmh: f64) -> f64 {
    kmh / 3600.0
}

/// Live, mutable configuration owned by one simulation instance.
///
/// The control surface changes these fields between steps; nothing here is
/// process-global, so independent simulations never see each other's settings.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize)]
pub struct DispatchConfig {
    pub service_radius: f64,
    pub arrival_rate_per_minute: f64,
    /// Speed given to newly added vehicles and applied fleet-wide on change.
    pub vehicle_speed: f64,
    pub arrival_process: ArrivalProcess,
}

impl DispatchConfig {
    pub fn from_params(params: &ScenarioParams) -> ControlResult<Self> {
        Ok(Self {
            service_radius: validate_radius(params.service_radius)?,
            arrival_rate_per_minute: validate_rate(params.arrival_rate_per_minute)?,
            vehicle_speed: validate_speed(params.initial_speed)?,
            arrival_process: params.arrival_process,
        })
    }
}

/// Parameters for building a simulation scenario.
///
/// Distances are in the same unit as `service_radius`; `initial_speed` is
/// that unit per simulated second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub service_radius: f64,
    pub initial_fleet_size: usize,
    pub initial_speed: f64,
    pub arrival_rate_per_minute: f64,
    pub arrival_process: ArrivalProcess,
    /// RNG seed. `None` draws a fresh seed, so runs are not reproducible.
    pub seed: Option<u64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            service_radius: DEFAULT_SERVICE_RADIUS,
            initial_fleet_size: DEFAULT_FLEET_SIZE,
            initial_speed: kmh_to_per_sec(DEFAULT_SPEED_KMH),
            arrival_rate_per_minute: DEFAULT_ARRIVAL_RATE_PER_MINUTE,
            arrival_process: ArrivalProcess::Poisson,
            seed: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_service_radius(mut self, radius: f64) -> Self {
        self.service_radius = radius;
        self
    }

    pub fn with_fleet_size(mut self, fleet_size: usize) -> Self {
        self.initial_fleet_size = fleet_size;
        self
    }

    /// Vehicle speed in distance units per simulated second.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.initial_speed = speed;
        self
    }

    /// Vehicle speed in km/h, for a radius expressed in km.
    pub fn with_speed_kmh(mut self, kmh: f64) -> Self {
        self.initial_speed = kmh_to_per_sec(kmh);
        self
    }

    pub fn with_arrival_rate(mut self, per_minute: f64) -> Self {
        self.arrival_rate_per_minute = per_minute;
        self
    }

    pub fn with_arrival_process(mut self, process: ArrivalProcess) -> Self {
        self.arrival_process = process;
        self
    }

    pub fn validate(&self) -> ControlResult<()> {
        DispatchConfig::from_params(self).map(|_| ())
    }
}
