mod build;
mod params;

pub use build::build_scenario;
pub use params::{kmh_to_per_sec, DispatchConfig, ScenarioParams};
