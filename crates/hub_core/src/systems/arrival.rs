use bevy_ecs::prelude::{Commands, Res, ResMut};
use log::debug;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::demand::DemandGenerator;
use crate::ecs::Pending;
use crate::scenario::DispatchConfig;
use crate::telemetry::DispatchTelemetry;

/// Materialize a pending request and chain the next arrival.
pub fn arrival_system(
    mut commands: Commands,
    mut clock: ResMut<SimulationClock>,
    mut demand: ResMut<DemandGenerator>,
    mut telemetry: ResMut<DispatchTelemetry>,
    config: Res<DispatchConfig>,
    event: Res<CurrentEvent>,
) {
    if event.0.kind != EventKind::Arrival {
        return;
    }

    let request = demand.draw_request(clock.now(), &config);
    debug!(
        "t={} arrival {} {:?} at distance {:.3}",
        request.created_at, request.id, request.direction, request.pickup_distance
    );
    commands.spawn((request, Pending));
    telemetry.record_arrival();

    demand.schedule_next_arrival(&mut clock, &config);
}
