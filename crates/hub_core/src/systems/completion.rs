use bevy_ecs::prelude::{Query, Res, ResMut};
use log::{debug, warn};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::Request;
use crate::telemetry::DispatchTelemetry;

/// Mark the subject request completed and fold it into the statistics.
pub fn completion_system(
    clock: Res<SimulationClock>,
    event: Res<CurrentEvent>,
    mut telemetry: ResMut<DispatchTelemetry>,
    mut requests: Query<&mut Request>,
) {
    if event.0.kind != EventKind::Completion {
        return;
    }
    let Some(EventSubject::Request(entity)) = event.0.subject else {
        return;
    };
    let Ok(mut request) = requests.get_mut(entity) else {
        warn!("completion for unknown request entity {entity:?}");
        return;
    };
    if !request.complete() {
        warn!("completion for {} in state {:?}", request.id, request.state);
        return;
    }

    debug!(
        "t={} completed {} (waited {} ms)",
        clock.now(),
        request.id,
        request.wait_time().unwrap_or_default()
    );
    telemetry.record_completion(entity, &request, clock.now());
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::ecs::{Direction, RequestId, RequestState, VehicleId};
    use crate::test_helpers::create_test_world;

    #[test]
    fn completion_marks_request_and_records_stats() {
        let mut world: World = create_test_world();
        let mut request = Request::new(RequestId(0), 1_000, 1.5, Direction::ToHub);
        assert!(request.assign(VehicleId(0), 3_000, 432_000));
        let entity = world.spawn(request).id();

        let event = {
            let mut clock = world.resource_mut::<SimulationClock>();
            clock.schedule_at(
                435_000,
                EventKind::Completion,
                Some(EventSubject::Request(entity)),
            );
            clock.pop_next().expect("completion")
        };
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(completion_system);
        schedule.run(&mut world);

        let state = world.get::<Request>(entity).expect("request").state;
        assert_eq!(state, RequestState::Completed);

        let telemetry = world.resource::<DispatchTelemetry>();
        assert_eq!(telemetry.completed_count, 1);
        assert_eq!(telemetry.total_wait_ms, 2_000);
        assert_eq!(telemetry.total_service_ms, 432_000);
        assert_eq!(telemetry.completed_requests[0].completed_at, 435_000);
    }

    #[test]
    fn completion_ignores_requests_that_were_never_assigned() {
        let mut world: World = create_test_world();
        let entity = world
            .spawn(Request::new(RequestId(0), 0, 1.0, Direction::FromHub))
            .id();
        world.insert_resource(CurrentEvent(crate::clock::Event {
            timestamp: 0,
            sequence: 0,
            kind: EventKind::Completion,
            subject: Some(EventSubject::Request(entity)),
        }));

        let mut schedule = Schedule::default();
        schedule.add_systems(completion_system);
        schedule.run(&mut world);

        assert_eq!(world.resource::<DispatchTelemetry>().completed_count, 0);
        assert_eq!(
            world.get::<Request>(entity).expect("request").state,
            RequestState::Pending
        );
    }
}
