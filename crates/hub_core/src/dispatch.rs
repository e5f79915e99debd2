//! First-fit dispatch policy.
//!
//! One dispatch pass walks the pending requests oldest first and gives each
//! the first idle vehicle in registration order. The pass stops at the first
//! request that finds no vehicle: availability does not depend on the request,
//! and no vehicle frees up mid-pass, so later requests cannot succeed either.
//!
//! Matching runs against the fleet: a vehicle is claimed only once the caller
//! has accepted the [Assignment], so a vehicle matched earlier in the pass is
//! busy for the rest of it and a rejected assignment leaves no trace.

use bevy_ecs::prelude::Entity;

use crate::clock::secs_to_duration_ms;
use crate::ecs::{RequestId, VehicleId};
use crate::fleet::FleetRegistry;

/// A request waiting for a vehicle, as seen by the dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRequest {
    pub entity: Entity,
    pub id: RequestId,
    pub created_at: u64,
    pub pickup_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub request: Entity,
    pub vehicle: VehicleId,
    pub service_duration: u64,
    pub completes_at: u64,
}

/// Round-trip service time in ms: out to the rider and back over the same
/// distance, whichever direction the rider travels.
pub fn service_duration_ms(pickup_distance: f64, speed: f64) -> u64 {
    secs_to_duration_ms(2.0 * pickup_distance / speed)
}

/// Sort pending requests oldest first; request id breaks ties.
pub fn order_pending(pending: &mut [PendingRequest]) {
    pending.sort_by_key(|p| (p.created_at, p.id));
}

/// Claim vehicles for `pending` (already in dispatch order) at time `now`.
///
/// `accept` sees each planned assignment before the vehicle is touched. When
/// it returns `true` the vehicle gets `next_free_at = now + service_duration`
/// and its trip count bumped; when it returns `false` the vehicle stays idle
/// and the pass moves on to the next request.
pub fn match_pending<F>(
    fleet: &mut FleetRegistry,
    now: u64,
    pending: &[PendingRequest],
    mut accept: F,
) -> Vec<Assignment>
where
    F: FnMut(&Assignment) -> bool,
{
    let mut assignments = Vec::new();
    for request in pending {
        let Some(vehicle) = fleet.find_first_available_mut(now) else {
            break;
        };
        let service_duration = service_duration_ms(request.pickup_distance, vehicle.speed);
        let assignment = Assignment {
            request: request.entity,
            vehicle: vehicle.id,
            service_duration,
            completes_at: now.saturating_add(service_duration),
        };
        if !accept(&assignment) {
            continue;
        }
        vehicle.next_free_at = assignment.completes_at;
        vehicle.completed_trip_count += 1;
        assignments.push(assignment);
    }
    assignments
}
