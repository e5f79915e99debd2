//! Statistics: completed-request records and the running aggregates behind `stats()`.

use std::fmt;

use bevy_ecs::prelude::{Entity, Resource, World};
use serde::Serialize;

use crate::clock::{ms_to_secs, SimulationClock};
use crate::ecs::{Direction, Request, RequestId, VehicleId};
use crate::fleet::FleetRegistry;

/// One completed request, recorded when its completion event fires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRequestRecord {
    #[serde(skip)]
    pub request_entity: Entity,
    pub request_id: RequestId,
    pub vehicle_id: Option<VehicleId>,
    pub direction: Direction,
    pub pickup_distance: f64,
    pub created_at: u64,
    pub service_started_at: u64,
    pub service_duration: u64,
    pub completed_at: u64,
}

impl CompletedRequestRecord {
    /// Time from arrival to dispatch.
    pub fn wait_time(&self) -> u64 {
        self.service_started_at.saturating_sub(self.created_at)
    }

    /// Time from arrival to the vehicle being free again.
    pub fn time_in_system(&self) -> u64 {
        self.completed_at.saturating_sub(self.created_at)
    }
}

/// Running totals over the request lifecycle. Insert as a resource.
#[derive(Debug, Default, Resource)]
pub struct DispatchTelemetry {
    /// Requests waiting for a vehicle.
    pub pending_count: usize,
    /// Requests with a vehicle on the way, not yet completed.
    pub assigned_count: usize,
    pub completed_count: u64,
    pub total_wait_ms: u64,
    pub total_service_ms: u64,
    pub completed_requests: Vec<CompletedRequestRecord>,
}

impl DispatchTelemetry {
    pub fn record_arrival(&mut self) {
        self.pending_count += 1;
    }

    pub fn record_assignment(&mut self) {
        self.pending_count = self.pending_count.saturating_sub(1);
        self.assigned_count += 1;
    }

    /// Fold a just-completed request into the aggregates.
    pub fn record_completion(&mut self, entity: Entity, request: &Request, completed_at: u64) {
        let service_started_at = request.service_started_at.unwrap_or(completed_at);
        let service_duration = request.service_duration.unwrap_or_default();
        let record = CompletedRequestRecord {
            request_entity: entity,
            request_id: request.id,
            vehicle_id: request.vehicle,
            direction: request.direction,
            pickup_distance: request.pickup_distance,
            created_at: request.created_at,
            service_started_at,
            service_duration,
            completed_at,
        };
        self.assigned_count = self.assigned_count.saturating_sub(1);
        self.completed_count += 1;
        self.total_wait_ms += record.wait_time();
        self.total_service_ms += service_duration;
        self.completed_requests.push(record);
    }

    pub fn avg_wait_ms(&self) -> f64 {
        if self.completed_count == 0 {
            0.0
        } else {
            self.total_wait_ms as f64 / self.completed_count as f64
        }
    }

    pub fn avg_service_ms(&self) -> f64 {
        if self.completed_count == 0 {
            0.0
        } else {
            self.total_service_ms as f64 / self.completed_count as f64
        }
    }
}

/// Point-in-time view of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimStats {
    pub current_time_ms: u64,
    pub completed_count: u64,
    pub avg_wait_ms: f64,
    pub avg_service_ms: f64,
    /// Requests still pending (no vehicle yet).
    pub backlog_length: usize,
    /// Requests with a vehicle on the way, not yet completed.
    pub assigned_count: usize,
    pub fleet_size: usize,
    pub idle_vehicles: usize,
}

impl SimStats {
    pub fn current_time_secs(&self) -> f64 {
        ms_to_secs(self.current_time_ms)
    }

    pub fn avg_wait_secs(&self) -> f64 {
        self.avg_wait_ms / 1000.0
    }

    pub fn avg_service_secs(&self) -> f64 {
        self.avg_service_ms / 1000.0
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[t={:.2}s] Completed: {}, Queue: {}, Avg Wait: {:.2}s, Avg Travel: {:.2}s, Idle: {}/{}",
            self.current_time_secs(),
            self.completed_count,
            self.backlog_length,
            self.avg_wait_secs(),
            self.avg_service_secs(),
            self.idle_vehicles,
            self.fleet_size,
        )
    }
}

/// Read-only statistics query. Takes `&World`, so calling it any number of
/// times between steps returns identical results.
pub fn collect_stats(world: &World) -> SimStats {
    let now = world
        .get_resource::<SimulationClock>()
        .map(|clock| clock.now())
        .unwrap_or_default();

    let (fleet_size, idle_vehicles) = world
        .get_resource::<FleetRegistry>()
        .map(|fleet| (fleet.len(), fleet.idle_count(now)))
        .unwrap_or_default();

    let (backlog_length, assigned_count, completed_count, avg_wait_ms, avg_service_ms) = world
        .get_resource::<DispatchTelemetry>()
        .map(|t| {
            (
                t.pending_count,
                t.assigned_count,
                t.completed_count,
                t.avg_wait_ms(),
                t.avg_service_ms(),
            )
        })
        .unwrap_or_default();

    SimStats {
        current_time_ms: now,
        completed_count,
        avg_wait_ms,
        avg_service_ms,
        backlog_length,
        assigned_count,
        fleet_size,
        idle_vehicles,
    }
}
