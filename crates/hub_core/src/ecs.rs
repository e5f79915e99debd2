use std::fmt;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub u64);

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

/// Trip direction relative to the hub. Both directions cover the same
/// distance twice, so service time does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    ToHub,
    FromHub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    Pending,
    Assigned,
    Completed,
}

/// Marker for requests still waiting for a vehicle. Removed on assignment,
/// so the dispatch query only ever touches the live backlog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Component)]
pub struct Pending;

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Request {
    pub id: RequestId,
    /// Simulation time when the request arrived.
    pub created_at: u64,
    /// Distance between the hub and the rider's end of the trip.
    pub pickup_distance: f64,
    pub direction: Direction,
    pub state: RequestState,
    /// Simulation time when a vehicle was dispatched; set on assignment.
    pub service_started_at: Option<u64>,
    /// Round-trip duration in ms; set on assignment.
    pub service_duration: Option<u64>,
    pub vehicle: Option<VehicleId>,
}

impl Request {
    pub fn new(id: RequestId, created_at: u64, pickup_distance: f64, direction: Direction) -> Self {
        Self {
            id,
            created_at,
            pickup_distance,
            direction,
            state: RequestState::Pending,
            service_started_at: None,
            service_duration: None,
            vehicle: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == RequestState::Pending
    }

    /// Time spent waiting for a vehicle, once one has been dispatched.
    pub fn wait_time(&self) -> Option<u64> {
        self.service_started_at
            .map(|started| started.saturating_sub(self.created_at))
    }

    /// Scheduled (or actual) completion time of the round trip.
    pub fn completes_at(&self) -> Option<u64> {
        match (self.service_started_at, self.service_duration) {
            (Some(started), Some(duration)) => Some(started.saturating_add(duration)),
            _ => None,
        }
    }

    /// Pending -> Assigned. Returns `false` (and changes nothing) from any other state.
    pub(crate) fn assign(&mut self, vehicle: VehicleId, now: u64, service_duration: u64) -> bool {
        if self.state != RequestState::Pending {
            return false;
        }
        self.state = RequestState::Assigned;
        self.vehicle = Some(vehicle);
        self.service_started_at = Some(now.max(self.created_at));
        self.service_duration = Some(service_duration);
        true
    }

    /// Assigned -> Completed. Returns `false` (and changes nothing) from any other state.
    pub(crate) fn complete(&mut self) -> bool {
        if self.state != RequestState::Assigned {
            return false;
        }
        self.state = RequestState::Completed;
        true
    }
}
