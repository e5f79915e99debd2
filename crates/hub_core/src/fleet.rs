//! Fleet registry: the ordered set of vehicles and their availability.
//!
//! Registration order matters. Lookups are first-fit in that order, not
//! nearest-vehicle or least-recently-used, so under sustained load the
//! vehicles registered last may see few or no trips. That is the documented
//! dispatch policy.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::ecs::VehicleId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Distance units per simulated second.
    pub speed: f64,
    /// Simulation time at or before which the vehicle is idle.
    pub next_free_at: u64,
    pub completed_trip_count: u64,
}

impl Vehicle {
    /// Idle iff `next_free_at <= now`. Derived from time, never stored.
    pub fn is_idle(&self, now: u64) -> bool {
        self.next_free_at <= now
    }
}

#[derive(Debug, Default, Resource)]
pub struct FleetRegistry {
    vehicles: Vec<Vehicle>,
    next_id: u64,
}

impl FleetRegistry {
    /// Append a vehicle that is idle from `now`. Ids are never reused.
    pub fn add_vehicle(&mut self, speed: f64, now: u64) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        self.vehicles.push(Vehicle {
            id,
            speed,
            next_free_at: now,
            completed_trip_count: 0,
        });
        id
    }

    /// Remove the first vehicle (in registration order) idle at `now`.
    /// `None` when every vehicle is busy or the fleet is empty.
    pub fn remove_idle_vehicle(&mut self, now: u64) -> Option<VehicleId> {
        let index = self.vehicles.iter().position(|v| v.is_idle(now))?;
        Some(self.vehicles.remove(index).id)
    }

    pub fn find_first_available(&self, now: u64) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.is_idle(now))
    }

    pub fn find_first_available_mut(&mut self, now: u64) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.is_idle(now))
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Overwrite every vehicle's speed. Busy vehicles keep their `next_free_at`.
    pub fn set_speed_all(&mut self, speed: f64) {
        for vehicle in &mut self.vehicles {
            vehicle.speed = speed;
        }
    }

    pub fn idle_count(&self, now: u64) -> usize {
        self.vehicles.iter().filter(|v| v.is_idle(now)).count()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
