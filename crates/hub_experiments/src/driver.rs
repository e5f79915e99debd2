//! Profile-driven runs: replay a time-of-day demand curve through the
//! control surface.

use hub_core::profile::DemandProfile;
use hub_core::simulation::Simulation;
use hub_core::telemetry::SimStats;
use log::{debug, info};

/// Advance `sim` to `end_ms` in slices of `update_interval_ms`.
///
/// At the start of each slice the profile's rate for the current time of day
/// is pushed through `set_arrival_rate`; the rate change takes effect from
/// the next arrival gap drawn. Hours with a zero rate are skipped and the
/// previous rate stays in effect. `hook` sees the stats at the end of every
/// slice. Returns the number of steps taken.
pub fn run_with_profile<F>(
    sim: &mut Simulation,
    profile: &DemandProfile,
    end_ms: u64,
    update_interval_ms: u64,
    mut hook: F,
) -> usize
where
    F: FnMut(&SimStats),
{
    let interval = update_interval_ms.max(1);
    let mut cursor = sim.horizon();
    let mut steps = 0;

    while cursor < end_ms {
        let rate = profile.rate_at(cursor);
        if rate != sim.config().arrival_rate_per_minute {
            match sim.set_arrival_rate(rate) {
                Ok(()) => info!("t={cursor} profile rate {rate:.2} req/min"),
                Err(err) => debug!("t={cursor} keeping previous rate: {err}"),
            }
        }

        let slice_end = cursor.saturating_add(interval).min(end_ms);
        steps += sim.run_until(slice_end);
        hook(&sim.stats());
        cursor = slice_end;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::clock::{ONE_HOUR_MS, ONE_MIN_MS};
    use hub_core::demand::ArrivalProcess;
    use hub_core::profile::HOURS_PER_DAY;
    use hub_core::scenario::ScenarioParams;

    fn fixed_interval_sim() -> Simulation {
        let params = ScenarioParams::default()
            .with_seed(5)
            .with_fleet_size(0)
            .with_arrival_rate(1.0)
            .with_arrival_process(ArrivalProcess::FixedInterval);
        Simulation::new(&params).expect("valid scenario")
    }

    #[test]
    fn each_hour_uses_its_own_rate() {
        let mut counts = [60.0; HOURS_PER_DAY];
        counts[1] = 600.0;
        let profile = DemandProfile::from_hourly_counts(counts);
        let mut sim = fixed_interval_sim();

        let mut backlog_by_hour = Vec::new();
        run_with_profile(&mut sim, &profile, 2 * ONE_HOUR_MS, ONE_HOUR_MS, |stats| {
            backlog_by_hour.push(stats.backlog_length)
        });

        assert_eq!(backlog_by_hour.len(), 2);
        assert_eq!(sim.config().arrival_rate_per_minute, 10.0);
        // 1/min for the first hour, 10/min for the second.
        assert_eq!(backlog_by_hour[0], 59);
        assert!(backlog_by_hour[1] >= 59 + 590);
    }

    #[test]
    fn zero_rate_hours_keep_the_previous_rate() {
        let mut counts = [0.0; HOURS_PER_DAY];
        counts[0] = 120.0;
        let profile = DemandProfile::from_hourly_counts(counts);
        let mut sim = fixed_interval_sim();

        run_with_profile(&mut sim, &profile, 3 * ONE_HOUR_MS, ONE_HOUR_MS, |_| {});
        assert_eq!(sim.config().arrival_rate_per_minute, 2.0);
    }

    #[test]
    fn hook_runs_once_per_slice_even_without_events() {
        let profile = DemandProfile::flat(0.01);
        let mut sim = fixed_interval_sim();
        let mut calls = 0;
        run_with_profile(&mut sim, &profile, 10 * ONE_MIN_MS, ONE_MIN_MS, |_| calls += 1);
        assert_eq!(calls, 10);
    }
}
