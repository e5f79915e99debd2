use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

pub(crate) fn smallest_fleet_meeting_target_impl<'a>(
    results: &'a [SimulationResult],
    parameter_sets: &'a [ParameterSet],
    max_avg_wait_ms: f64,
) -> Option<&'a ParameterSet> {
    if results.is_empty() || results.len() != parameter_sets.len() {
        return None;
    }

    results
        .iter()
        .zip(parameter_sets)
        .filter(|(result, _)| result.completed_count > 0 && result.avg_wait_ms <= max_avg_wait_ms)
        .min_by(|(a, _), (b, _)| {
            a.fleet_size
                .cmp(&b.fleet_size)
                .then(a.avg_wait_ms.total_cmp(&b.avg_wait_ms))
        })
        .map(|(_, params)| params)
}
