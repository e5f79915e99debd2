//! Parameter variation framework for exploring fleet sizing and demand levels.
//!
//! A [ParameterSpace] lists the values to try for each knob; unset knobs fall
//! back to the base [ScenarioParams]. Grid search takes the Cartesian
//! product, random sampling draws combinations with a seeded RNG.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use hub_core::clock::ONE_HOUR_MS;
use hub_core::demand::ArrivalProcess;
use hub_core::scenario::{kmh_to_per_sec, ScenarioParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Simulated time covered by each run unless overridden.
pub const DEFAULT_DURATION_MS: u64 = 4 * ONE_HOUR_MS;

/// A single parameter configuration for a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    /// Scenario parameters, without the seed.
    pub params: ScenarioParams,
    /// Experiment ID shared by every run of the same combination.
    pub experiment_id: String,
    /// Run ID within the experiment (repeated runs differ only by seed).
    pub run_id: usize,
    pub seed: u64,
    /// Simulated time to run for.
    pub duration_ms: u64,
}

impl ParameterSet {
    pub fn new(
        params: ScenarioParams,
        experiment_id: String,
        run_id: usize,
        seed: u64,
        duration_ms: u64,
    ) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
            duration_ms,
        }
    }

    /// Get the scenario params with seed applied.
    pub fn scenario_params(&self) -> ScenarioParams {
        self.params.clone().with_seed(self.seed)
    }
}

#[derive(Debug, Clone, Copy)]
struct Combination {
    fleet_size: usize,
    arrival_rate: f64,
    speed: f64,
    process: ArrivalProcess,
}

/// Defines a parameter space for exploration.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    base: ScenarioParams,
    fleet_sizes: Vec<usize>,
    arrival_rates: Vec<f64>,
    /// Vehicle speeds in distance units per second.
    speeds: Vec<f64>,
    arrival_processes: Vec<ArrivalProcess>,
    runs_per_combination: usize,
    duration_ms: u64,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base: ScenarioParams::default(),
            fleet_sizes: vec![],
            arrival_rates: vec![],
            speeds: vec![],
            arrival_processes: vec![],
            runs_per_combination: 1,
            duration_ms: DEFAULT_DURATION_MS,
        }
    }

    pub fn grid() -> Self {
        Self::new()
    }

    pub fn fleet_size(mut self, sizes: Vec<usize>) -> Self {
        self.fleet_sizes = sizes;
        self
    }

    pub fn arrival_rate(mut self, per_minute: Vec<f64>) -> Self {
        self.arrival_rates = per_minute;
        self
    }

    pub fn speed(mut self, speeds: Vec<f64>) -> Self {
        self.speeds = speeds;
        self
    }

    /// Speeds in km/h, for a service radius in km.
    pub fn speed_kmh(self, kmh: Vec<f64>) -> Self {
        self.speed(kmh.into_iter().map(kmh_to_per_sec).collect())
    }

    pub fn arrival_process(mut self, processes: Vec<ArrivalProcess>) -> Self {
        self.arrival_processes = processes;
        self
    }

    /// Repeat every combination with `runs` different seeds.
    pub fn runs_per_combination(mut self, runs: usize) -> Self {
        self.runs_per_combination = runs.max(1);
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Set base parameters (used as defaults).
    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    fn values<T: Clone>(values: &[T], fallback: T) -> Vec<T> {
        if values.is_empty() {
            vec![fallback]
        } else {
            values.to_vec()
        }
    }

    fn combinations(&self) -> Vec<Combination> {
        let fleet_sizes = Self::values(&self.fleet_sizes, self.base.initial_fleet_size);
        let rates = Self::values(&self.arrival_rates, self.base.arrival_rate_per_minute);
        let speeds = Self::values(&self.speeds, self.base.initial_speed);
        let processes = Self::values(&self.arrival_processes, self.base.arrival_process);

        let mut combinations = Vec::new();
        for &fleet_size in &fleet_sizes {
            for &arrival_rate in &rates {
                for &speed in &speeds {
                    for &process in &processes {
                        combinations.push(Combination {
                            fleet_size,
                            arrival_rate,
                            speed,
                            process,
                        });
                    }
                }
            }
        }
        combinations
    }

    fn apply(&self, combo: Combination) -> ScenarioParams {
        self.base
            .clone()
            .with_fleet_size(combo.fleet_size)
            .with_arrival_rate(combo.arrival_rate)
            .with_speed(combo.speed)
            .with_arrival_process(combo.process)
    }

    /// Generate all parameter sets using grid search (Cartesian product).
    pub fn generate(&self) -> Vec<ParameterSet> {
        let base_seed = self.base.seed.unwrap_or(0);
        self.combinations()
            .into_iter()
            .enumerate()
            .flat_map(|(experiment_id, combo)| {
                let params = self.apply(combo);
                (0..self.runs_per_combination).map(move |run_id| {
                    let seed = base_seed
                        .wrapping_add((experiment_id * self.runs_per_combination + run_id) as u64)
                        .wrapping_mul(0x9e3779b9);
                    ParameterSet::new(
                        params.clone(),
                        format!("exp_{experiment_id}"),
                        run_id,
                        seed,
                        self.duration_ms,
                    )
                })
            })
            .collect()
    }

    /// Draw `count` distinct combinations at random (Monte Carlo sampling).
    /// Returns fewer when the space has fewer distinct combinations.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        let combinations = self.combinations();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        let mut parameter_sets = Vec::new();
        let mut attempts = 0;
        const MAX_ATTEMPTS: usize = 10_000;

        while parameter_sets.len() < count && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let index = rng.gen_range(0..combinations.len());
            if !seen.insert(index) {
                continue;
            }
            let seed_value = seed
                .wrapping_add(parameter_sets.len() as u64)
                .wrapping_mul(0x9e3779b9);
            parameter_sets.push(ParameterSet::new(
                self.apply(combinations[index]),
                format!("random_{}", parameter_sets.len()),
                0,
                seed_value,
                self.duration_ms,
            ));
        }
        parameter_sets
    }
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a scenario from a JSON file. Missing fields take their defaults.
pub fn load_scenario_params(
    path: impl AsRef<Path>,
) -> Result<ScenarioParams, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let params: ScenarioParams = serde_json::from_str(&contents)?;
    params.validate()?;
    Ok(params)
}
