//! Control surface: validated runtime reconfiguration between steps.
//!
//! Every operation validates its input before touching the world. These are
//! the only entry points a presentation layer or external driver should use
//! to change a running simulation.

use bevy_ecs::prelude::World;
use log::info;

use crate::clock::SimulationClock;
use crate::demand::ArrivalProcess;
use crate::ecs::VehicleId;
use crate::error::{validate_rate, validate_speed, ControlError, ControlResult};
use crate::fleet::FleetRegistry;
use crate::scenario::DispatchConfig;

/// Add a vehicle at the configured speed. Always succeeds.
pub fn add_vehicle(world: &mut World) -> VehicleId {
    let speed = world.resource::<DispatchConfig>().vehicle_speed;
    insert_vehicle(world, speed)
}

/// Add a vehicle with its own speed.
pub fn add_vehicle_with_speed(world: &mut World, speed: f64) -> ControlResult<VehicleId> {
    let speed = validate_speed(speed)?;
    Ok(insert_vehicle(world, speed))
}

fn insert_vehicle(world: &mut World, speed: f64) -> VehicleId {
    let now = world.resource::<SimulationClock>().now();
    let mut fleet = world.resource_mut::<FleetRegistry>();
    let id = fleet.add_vehicle(speed, now);
    info!("t={now} added vehicle {id} (fleet size {})", fleet.len());
    id
}

/// Remove the first idle vehicle. Busy vehicles are never removed, so every
/// scheduled completion still refers to a live trip.
pub fn remove_idle_vehicle(world: &mut World) -> ControlResult<VehicleId> {
    let now = world.resource::<SimulationClock>().now();
    let mut fleet = world.resource_mut::<FleetRegistry>();
    match fleet.remove_idle_vehicle(now) {
        Some(id) => {
            info!("t={now} removed vehicle {id} (fleet size {})", fleet.len());
            Ok(id)
        }
        None => {
            info!("t={now} no idle vehicle to remove");
            Err(ControlError::NoIdleVehicle)
        }
    }
}

/// Change the arrival rate. The arrival already queued keeps its time; the
/// new rate applies from the next gap drawn.
pub fn set_arrival_rate(world: &mut World, per_minute: f64) -> ControlResult<()> {
    let rate = validate_rate(per_minute)?;
    world.resource_mut::<DispatchConfig>().arrival_rate_per_minute = rate;
    info!("arrival rate set to {rate} req/min");
    Ok(())
}

/// Change the speed of the whole fleet, busy vehicles included. Trips already
/// under way keep their completion time.
pub fn set_vehicle_speed(world: &mut World, speed: f64) -> ControlResult<()> {
    let speed = validate_speed(speed)?;
    world.resource_mut::<DispatchConfig>().vehicle_speed = speed;
    world.resource_mut::<FleetRegistry>().set_speed_all(speed);
    info!("vehicle speed set to {speed}");
    Ok(())
}

pub fn set_arrival_process(world: &mut World, process: ArrivalProcess) {
    world.resource_mut::<DispatchConfig>().arrival_process = process;
    info!("arrival process set to {process:?}");
}
