//! Metrics extraction from simulation results.

use hub_core::ecs::RequestState;
use hub_core::simulation::Simulation;
use serde::Serialize;

/// Aggregated metrics from a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Simulated time at the end of the run.
    pub simulated_ms: u64,
    pub requests_created: usize,
    pub completed_count: u64,
    /// Requests still waiting for a vehicle at the end.
    pub final_backlog: usize,
    pub avg_wait_ms: f64,
    pub median_wait_ms: f64,
    pub p90_wait_ms: f64,
    pub avg_service_ms: f64,
    pub fleet_size: usize,
    /// Share of fleet time spent on trips, in `[0, 1]`.
    pub vehicle_utilisation: f64,
    /// Fewest and most trips handed to any single vehicle. A wide spread is
    /// the signature of first-fit dispatch.
    pub min_trips_per_vehicle: u64,
    pub max_trips_per_vehicle: u64,
}

impl SimulationResult {
    /// Calculate (avg, median, p90) from a vector of values.
    pub(crate) fn calculate_stats(values: &[u64]) -> (f64, f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
        } else {
            sorted[sorted.len() / 2] as f64
        };
        let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
        let p90 = sorted[p90_idx.min(sorted.len() - 1)] as f64;

        (avg, median, p90)
    }

    pub fn avg_wait_secs(&self) -> f64 {
        self.avg_wait_ms / 1000.0
    }
}

/// Extract metrics from a simulation that has been run.
pub fn extract_metrics(sim: &Simulation) -> SimulationResult {
    let stats = sim.stats();
    let now = sim.now();

    let waits: Vec<u64> = sim
        .completed_requests()
        .iter()
        .map(|record| record.wait_time())
        .collect();
    let (avg_wait_ms, median_wait_ms, p90_wait_ms) = SimulationResult::calculate_stats(&waits);

    let requests = sim.requests();
    let busy_ms: u64 = requests
        .iter()
        .filter(|r| r.state != RequestState::Pending)
        .filter_map(|r| Some((r.service_started_at?, r.completes_at()?)))
        .map(|(started, ends)| ends.min(now).saturating_sub(started))
        .sum();
    let fleet_time = stats.fleet_size as f64 * now as f64;
    let vehicle_utilisation = if fleet_time > 0.0 {
        (busy_ms as f64 / fleet_time).min(1.0)
    } else {
        0.0
    };

    let trips = sim.vehicles().iter().map(|v| v.completed_trip_count);
    let min_trips_per_vehicle = trips.clone().min().unwrap_or_default();
    let max_trips_per_vehicle = trips.max().unwrap_or_default();

    SimulationResult {
        simulated_ms: now,
        requests_created: requests.len(),
        completed_count: stats.completed_count,
        final_backlog: stats.backlog_length,
        avg_wait_ms,
        median_wait_ms,
        p90_wait_ms,
        avg_service_ms: stats.avg_service_ms,
        fleet_size: stats.fleet_size,
        vehicle_utilisation,
        min_trips_per_vehicle,
        max_trips_per_vehicle,
    }
}
