//! Dispatch pass: runs after every processed event.

use bevy_ecs::prelude::{Commands, Entity, Query, ResMut, With};
use log::{debug, warn};

use crate::clock::{EventKind, EventSubject, SimulationClock};
use crate::dispatch::{match_pending, order_pending, PendingRequest};
use crate::ecs::{Pending, Request};
use crate::fleet::FleetRegistry;
use crate::telemetry::DispatchTelemetry;

pub fn dispatch_system(
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut fleet: ResMut<FleetRegistry>,
    mut telemetry: ResMut<DispatchTelemetry>,
    mut requests: Query<(Entity, &mut Request), With<Pending>>,
) {
    let now = clock.now();

    let mut pending: Vec<PendingRequest> = requests
        .iter()
        .filter(|(_, request)| request.is_pending())
        .map(|(entity, request)| PendingRequest {
            entity,
            id: request.id,
            created_at: request.created_at,
            pickup_distance: request.pickup_distance,
        })
        .collect();
    if pending.is_empty() {
        return;
    }
    order_pending(&mut pending);

    match_pending(&mut fleet, now, &pending, |assignment| {
        let Ok((_, mut request)) = requests.get_mut(assignment.request) else {
            warn!("dispatch to unknown request entity {:?}", assignment.request);
            return false;
        };
        if !request.assign(assignment.vehicle, now, assignment.service_duration) {
            warn!("dispatch for {} in state {:?}", request.id, request.state);
            return false;
        }
        debug!(
            "t={now} dispatched {} to {} for {} ms",
            request.id, assignment.vehicle, assignment.service_duration
        );
        commands.entity(assignment.request).remove::<Pending>();
        telemetry.record_assignment();
        clock.schedule_at(
            assignment.completes_at,
            EventKind::Completion,
            Some(EventSubject::Request(assignment.request)),
        );
        true
    });
}
