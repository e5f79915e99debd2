//! Time-of-day demand profiles.
//!
//! A profile holds one arrival rate (requests per minute) per hour of the day.
//! The engine never reads a profile directly: a driver looks up
//! [DemandProfile::rate_at] and pushes it through `set_arrival_rate`.

use serde::{Deserialize, Serialize};

use crate::clock::ONE_HOUR_MS;

pub const HOURS_PER_DAY: usize = 24;
const MINUTES_PER_HOUR: usize = 60;

/// Passengers per day used by the bundled rush-hour curves.
pub const DEFAULT_DAILY_TOTAL: f64 = 30_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandProfile {
    /// Mean arrival rate in requests per minute for each hour, midnight first.
    pub hourly_rates: [f64; HOURS_PER_DAY],
}

impl DemandProfile {
    pub fn flat(rate_per_minute: f64) -> Self {
        Self {
            hourly_rates: [rate_per_minute; HOURS_PER_DAY],
        }
    }

    /// Build from request counts per hour.
    pub fn from_hourly_counts(counts: [f64; HOURS_PER_DAY]) -> Self {
        Self {
            hourly_rates: counts.map(|count| count / MINUTES_PER_HOUR as f64),
        }
    }

    /// Morning and evening peaks over a low all-day base.
    pub fn bimodal_gamma(daily_total: f64) -> Self {
        Self::from_density(daily_total, |h| {
            0.4 * gamma_pdf(h - 8.0, 4, 0.5)
                + 0.4 * gamma_pdf(h - 16.0, 6, 1.0)
                + 0.2 * gamma_pdf(h, 3, 2.0)
        })
    }

    /// Four commute peaks with a small night floor.
    pub fn normal_mixture(daily_total: f64) -> Self {
        Self::from_density(daily_total, |h| {
            1.5 * normal_pdf(h, 9.0, 0.8)
                + 0.8 * normal_pdf(h, 11.0, 1.5)
                + 1.2 * normal_pdf(h, 16.0, 1.2)
                + 1.3 * normal_pdf(h, 19.0, 0.9)
                + 0.1 * gamma_pdf(h, 2, 3.0)
        })
    }

    /// Sample `density` (over hours of the day) at every minute midpoint,
    /// normalise the samples to `daily_total`, and fold them into hours.
    fn from_density<F: Fn(f64) -> f64>(daily_total: f64, density: F) -> Self {
        let samples: Vec<f64> = (0..HOURS_PER_DAY * MINUTES_PER_HOUR)
            .map(|minute| density((minute as f64 + 0.5) / MINUTES_PER_HOUR as f64))
            .collect();
        let mass: f64 = samples.iter().sum();

        let mut hourly_rates = [0.0; HOURS_PER_DAY];
        if mass > 0.0 {
            for (hour, chunk) in samples.chunks(MINUTES_PER_HOUR).enumerate() {
                let per_hour: f64 = chunk.iter().sum::<f64>() / mass * daily_total;
                hourly_rates[hour] = per_hour / MINUTES_PER_HOUR as f64;
            }
        }
        Self { hourly_rates }
    }

    /// Rate for the hour of day containing `time_ms`. Wraps every 24h.
    pub fn rate_at(&self, time_ms: u64) -> f64 {
        let hour = (time_ms / ONE_HOUR_MS) as usize % HOURS_PER_DAY;
        self.hourly_rates[hour]
    }

    pub fn daily_total(&self) -> f64 {
        self.hourly_rates.iter().sum::<f64>() * MINUTES_PER_HOUR as f64
    }

    pub fn peak_hour(&self) -> usize {
        self.hourly_rates
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (hour, &rate)| {
                if rate > best.1 {
                    (hour, rate)
                } else {
                    best
                }
            })
            .0
    }
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self::bimodal_gamma(DEFAULT_DAILY_TOTAL)
    }
}

/// Gamma density with integer shape `k` and scale `theta`; zero for `x <= 0`.
fn gamma_pdf(x: f64, k: u32, theta: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let factorial: f64 = (1..k).map(f64::from).product();
    x.powi(k as i32 - 1) * (-x / theta).exp() / (factorial * theta.powi(k as i32))
}

fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * std::f64::consts::PI).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_profile_is_constant() {
        let profile = DemandProfile::flat(100.0);
        assert_eq!(profile.rate_at(0), 100.0);
        assert_eq!(profile.rate_at(13 * ONE_HOUR_MS + 5), 100.0);
        assert!((profile.daily_total() - 144_000.0).abs() < 1e-6);
    }

    #[test]
    fn hourly_counts_become_per_minute_rates() {
        let mut counts = [0.0; HOURS_PER_DAY];
        counts[7] = 600.0;
        let profile = DemandProfile::from_hourly_counts(counts);
        assert_eq!(profile.rate_at(7 * ONE_HOUR_MS), 10.0);
        assert_eq!(profile.rate_at(8 * ONE_HOUR_MS), 0.0);
        assert_eq!(profile.peak_hour(), 7);
    }

    #[test]
    fn rate_wraps_after_a_day() {
        let profile = DemandProfile::bimodal_gamma(DEFAULT_DAILY_TOTAL);
        assert_eq!(
            profile.rate_at(3 * ONE_HOUR_MS),
            profile.rate_at(27 * ONE_HOUR_MS)
        );
    }

    #[test]
    fn rush_hour_curves_integrate_to_daily_total() {
        for profile in [
            DemandProfile::bimodal_gamma(DEFAULT_DAILY_TOTAL),
            DemandProfile::normal_mixture(DEFAULT_DAILY_TOTAL),
        ] {
            assert!((profile.daily_total() - DEFAULT_DAILY_TOTAL).abs() < 1e-6);
            assert!(profile.hourly_rates.iter().all(|r| *r >= 0.0));
        }
    }

    #[test]
    fn bimodal_gamma_peaks_in_the_morning_and_evening() {
        let profile = DemandProfile::bimodal_gamma(DEFAULT_DAILY_TOTAL);
        let morning = profile.rate_at(9 * ONE_HOUR_MS);
        let evening = profile.rate_at(20 * ONE_HOUR_MS);
        let midday = profile.rate_at(13 * ONE_HOUR_MS);
        assert!(morning > midday);
        assert!(evening > midday);
    }

    #[test]
    fn normal_mixture_is_busiest_around_nine() {
        let profile = DemandProfile::normal_mixture(DEFAULT_DAILY_TOTAL);
        assert_eq!(profile.peak_hour(), 9);
    }

    #[test]
    fn gamma_pdf_integrates_to_one() {
        let step = 0.001;
        let area: f64 = (0..40_000)
            .map(|i| gamma_pdf((i as f64 + 0.5) * step, 3, 2.0) * step)
            .sum();
        assert!((area - 1.0).abs() < 1e-3);
    }

    #[test]
    fn profile_loads_from_json() {
        let json = format!("{{\"hourly_rates\": {:?}}}", [2.5; HOURS_PER_DAY]);
        let profile: DemandProfile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(profile, DemandProfile::flat(2.5));
    }
}
