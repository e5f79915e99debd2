use hub_core::demand::ArrivalProcess;

use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

pub(crate) fn export_to_csv_impl(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    if results.len() != parameter_sets.len() {
        return Err(format!(
            "Results length ({}) doesn't match parameter_sets length ({})",
            results.len(),
            parameter_sets.len()
        )
        .into());
    }

    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "fleet_size",
        "arrival_rate_per_minute",
        "vehicle_speed",
        "service_radius",
        "arrival_process",
        "duration_ms",
        "simulated_ms",
        "requests_created",
        "completed_count",
        "final_backlog",
        "avg_wait_ms",
        "median_wait_ms",
        "p90_wait_ms",
        "avg_service_ms",
        "vehicle_utilisation",
        "min_trips_per_vehicle",
        "max_trips_per_vehicle",
    ])?;

    for (result, param_set) in results.iter().zip(parameter_sets) {
        let params = &param_set.params;
        let process = match params.arrival_process {
            ArrivalProcess::Poisson => "Poisson",
            ArrivalProcess::FixedInterval => "FixedInterval",
        };

        wtr.write_record([
            param_set.experiment_id.clone(),
            param_set.run_id.to_string(),
            param_set.seed.to_string(),
            params.initial_fleet_size.to_string(),
            params.arrival_rate_per_minute.to_string(),
            params.initial_speed.to_string(),
            params.service_radius.to_string(),
            process.to_string(),
            param_set.duration_ms.to_string(),
            result.simulated_ms.to_string(),
            result.requests_created.to_string(),
            result.completed_count.to_string(),
            result.final_backlog.to_string(),
            result.avg_wait_ms.to_string(),
            result.median_wait_ms.to_string(),
            result.p90_wait_ms.to_string(),
            result.avg_service_ms.to_string(),
            result.vehicle_utilisation.to_string(),
            result.min_trips_per_vehicle.to_string(),
            result.max_trips_per_vehicle.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
