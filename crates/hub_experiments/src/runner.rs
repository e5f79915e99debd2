//! Parallel simulation execution using rayon.
//!
//! Every run owns its own [Simulation]; nothing is shared between runs, so
//! the results are identical whatever the thread count.

use hub_core::simulation::Simulation;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use rayon::prelude::*;

use crate::metrics::{extract_metrics, SimulationResult};
use crate::parameters::ParameterSet;

/// Run one parameter set for its configured duration and extract metrics.
pub fn run_single_simulation(
    param_set: &ParameterSet,
) -> Result<SimulationResult, Box<dyn std::error::Error + Send + Sync>> {
    let mut sim = Simulation::new(&param_set.scenario_params())?;
    let steps = sim.run_until(param_set.duration_ms);
    debug!(
        "{} run {}: {steps} steps, t={} ms",
        param_set.experiment_id,
        param_set.run_id,
        sim.now()
    );
    Ok(extract_metrics(&sim))
}

/// Run multiple simulations in parallel with a progress bar.
///
/// Results come back in the same order as `parameter_sets`.
pub fn run_parallel_experiments(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
) -> Result<Vec<SimulationResult>, Box<dyn std::error::Error + Send + Sync>> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple simulations in parallel with optional progress bar.
///
/// Fails on the first parameter set that does not describe a valid scenario.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<SimulationResult>, Box<dyn std::error::Error + Send + Sync>> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )?
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set);
                if let Err(err) = &result {
                    warn!("{} run {} failed: {err}", param_set.experiment_id, param_set.run_id);
                }
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSpace;
    use hub_core::clock::ONE_HOUR_MS;

    #[test]
    fn single_simulation_produces_metrics() {
        let sets = ParameterSpace::grid()
            .fleet_size(vec![10])
            .duration_ms(ONE_HOUR_MS)
            .generate();
        let result = run_single_simulation(&sets[0]).expect("run");
        assert!(result.completed_count > 0);
        assert!(result.simulated_ms < ONE_HOUR_MS);
    }

    #[test]
    fn parallel_results_keep_input_order_and_match_serial_runs() {
        let sets = ParameterSpace::grid()
            .fleet_size(vec![5, 40])
            .arrival_rate(vec![20.0, 60.0])
            .duration_ms(ONE_HOUR_MS / 2)
            .generate();
        let results = run_parallel_experiments_with_progress(&sets, Some(2), false).expect("sweep");

        assert_eq!(results.len(), 4);
        for (set, result) in sets.iter().zip(&results) {
            assert_eq!(result.fleet_size, set.params.initial_fleet_size);
            assert_eq!(*result, run_single_simulation(set).expect("serial run"));
        }
    }

    #[test]
    fn invalid_parameter_set_fails_the_sweep() {
        let sets = ParameterSpace::grid().arrival_rate(vec![0.0]).generate();
        assert!(run_parallel_experiments_with_progress(&sets, Some(1), false).is_err());
    }
}
