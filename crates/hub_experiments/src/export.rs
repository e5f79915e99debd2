//! Result export and analysis utilities.

use std::fs::File;
use std::path::Path;

use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/ranking.rs"]
mod ranking;

/// Refuse an empty export before touching the filesystem.
fn create_export_file<T>(
    items: &[T],
    path: impl AsRef<Path>,
) -> Result<File, Box<dyn std::error::Error>> {
    if items.is_empty() {
        return Err(format!("no results to export to {}", path.as_ref().display()).into());
    }
    Ok(File::create(path)?)
}

/// Export simulation results to JSON: an array of result objects.
pub fn export_to_json(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = create_export_file(results, path)?;
    json::export_to_json_impl(results, file)
}

/// Export simulation results with parameters to CSV format.
///
/// One row per run; `results[i]` must belong to `parameter_sets[i]`.
///
/// # Errors
///
/// Returns an error if the slices differ in length or are empty, or if
/// file creation or CSV writing fails.
pub fn export_to_csv(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = create_export_file(results, path)?;
    csv::export_to_csv_impl(results, parameter_sets, file)
}

/// The parameter set with the smallest fleet whose average wait stays at or
/// below `max_avg_wait_ms`. Ties on fleet size go to the lower wait.
pub fn smallest_fleet_meeting_target<'a>(
    results: &'a [SimulationResult],
    parameter_sets: &'a [ParameterSet],
    max_avg_wait_ms: f64,
) -> Option<&'a ParameterSet> {
    ranking::smallest_fleet_meeting_target_impl(results, parameter_sets, max_avg_wait_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSpace;
    use tempfile::NamedTempFile;

    fn result(fleet_size: usize, avg_wait_ms: f64) -> SimulationResult {
        SimulationResult {
            simulated_ms: 3_600_000,
            requests_created: 6_000,
            completed_count: 5_000,
            final_backlog: 100,
            avg_wait_ms,
            median_wait_ms: avg_wait_ms,
            p90_wait_ms: avg_wait_ms * 2.0,
            avg_service_ms: 432_000.0,
            fleet_size,
            vehicle_utilisation: 0.9,
            min_trips_per_vehicle: 10,
            max_trips_per_vehicle: 40,
        }
    }

    #[test]
    fn json_export_writes_every_field() {
        let results = vec![result(25, 1_000.0)];
        let file = NamedTempFile::new().expect("temp file");
        export_to_json(&results, file.path()).expect("export");

        let contents = std::fs::read_to_string(file.path()).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&contents).expect("json");
        assert_eq!(parsed[0]["fleet_size"], 25);
        assert_eq!(parsed[0]["avg_wait_ms"], 1_000.0);
        assert!(contents.contains("vehicle_utilisation"));
    }

    #[test]
    fn csv_export_pairs_parameters_with_results() {
        let sets = ParameterSpace::grid().fleet_size(vec![10, 20]).generate();
        let results = vec![result(10, 5_000.0), result(20, 500.0)];
        let file = NamedTempFile::new().expect("temp file");
        export_to_csv(&results, &sets, file.path()).expect("export");

        let contents = std::fs::read_to_string(file.path()).expect("read");
        let mut lines = contents.lines();
        let header = lines.next().expect("header");
        assert!(header.starts_with("experiment_id,run_id,seed,fleet_size"));
        assert!(header.contains("p90_wait_ms"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn csv_export_rejects_mismatched_lengths() {
        let sets = ParameterSpace::grid().fleet_size(vec![10, 20]).generate();
        let file = NamedTempFile::new().expect("temp file");
        assert!(export_to_csv(&[result(10, 1.0)], &sets, file.path()).is_err());
        assert!(export_to_csv(&[], &[], file.path()).is_err());
    }

    #[test]
    fn empty_export_fails_without_creating_a_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("results.json");
        let err = export_to_json(&[], &path).expect_err("empty export");
        assert!(err.to_string().contains("no results"));
        assert!(!path.exists());
    }

    #[test]
    fn smallest_fleet_under_the_wait_target_wins() {
        let sets = ParameterSpace::grid().fleet_size(vec![10, 20, 30]).generate();
        let results = vec![result(10, 90_000.0), result(20, 30_000.0), result(30, 1_000.0)];

        let best = smallest_fleet_meeting_target(&results, &sets, 60_000.0).expect("match");
        assert_eq!(best.params.initial_fleet_size, 20);
        assert!(smallest_fleet_meeting_target(&results, &sets, 10.0).is_none());
        assert!(smallest_fleet_meeting_target(&results, &sets[..2], 60_000.0).is_none());
    }
}
