//! Demand generator: the stochastic arrival process and request materialization.
//!
//! Every arrival schedules its successor unconditionally, so the arrival chain
//! never dies regardless of what else is in the queue. Rate changes take effect
//! from the next gap drawn; an arrival already in the queue is not moved.

use bevy_ecs::prelude::Resource;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

use crate::clock::{secs_to_duration_ms, EventKind, SimulationClock};
use crate::ecs::{Direction, Request, RequestId};
use crate::scenario::DispatchConfig;

/// How inter-arrival gaps are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArrivalProcess {
    /// Exponential gaps with mean `60 / rate` seconds.
    #[default]
    Poisson,
    /// Constant gap of `60 / rate` seconds.
    FixedInterval,
}

impl ArrivalProcess {
    /// Sample the next inter-arrival gap in seconds for `rate_per_minute`.
    /// A non-positive rate yields an infinite gap.
    pub fn sample_gap_secs<R: Rng + ?Sized>(&self, rate_per_minute: f64, rng: &mut R) -> f64 {
        if rate_per_minute.is_nan() || rate_per_minute <= 0.0 {
            return f64::INFINITY;
        }
        let rate_per_sec = rate_per_minute / 60.0;
        match self {
            ArrivalProcess::Poisson => match Exp::new(rate_per_sec) {
                Ok(exp) => exp.sample(rng),
                Err(_) => f64::INFINITY,
            },
            ArrivalProcess::FixedInterval => 1.0 / rate_per_sec,
        }
    }
}

#[derive(Debug, Resource)]
pub struct DemandGenerator {
    rng: StdRng,
    next_request_id: u64,
}

impl DemandGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_request_id: 0,
        }
    }

    pub fn requests_created(&self) -> u64 {
        self.next_request_id
    }

    /// Draw the next gap (ms) from the configured process and rate.
    pub fn next_gap_ms(&mut self, config: &DispatchConfig) -> u64 {
        let secs = config
            .arrival_process
            .sample_gap_secs(config.arrival_rate_per_minute, &mut self.rng);
        secs_to_duration_ms(secs)
    }

    /// Schedule the next arrival relative to the clock's current time.
    pub fn schedule_next_arrival(&mut self, clock: &mut SimulationClock, config: &DispatchConfig) {
        let gap = self.next_gap_ms(config);
        clock.schedule_in(gap, EventKind::Arrival, None);
        debug!("next arrival in {gap} ms (t={})", clock.now().saturating_add(gap));
    }

    /// Materialize a pending request: direction uniform over both, pickup
    /// distance uniform over `[0, service_radius]`.
    pub fn draw_request(&mut self, now: u64, config: &DispatchConfig) -> Request {
        let id = RequestId(self.next_request_id);
        self.next_request_id += 1;
        let direction = if self.rng.gen_bool(0.5) {
            Direction::ToHub
        } else {
            Direction::FromHub
        };
        let pickup_distance = self.rng.gen_range(0.0..=config.service_radius);
        Request::new(id, now, pickup_distance, direction)
    }
}
