//! External drivers for the hub dispatch engine.
//!
//! The engine in `hub_core` only knows logical time. This crate runs it:
//!
//! - [`parameters`]: parameter spaces and scenario files
//! - [`runner`]: parallel sweeps using rayon
//! - [`metrics`]: per-run metrics extraction
//! - [`export`]: CSV/JSON export and fleet sizing
//! - [`driver`]: time-of-day demand profiles replayed through the control surface
//! - [`live`]: wall-clock pacing on a background thread
//!
//! ```no_run
//! use hub_experiments::{run_parallel_experiments, smallest_fleet_meeting_target, ParameterSpace};
//!
//! let sets = ParameterSpace::grid()
//!     .fleet_size(vec![20, 30, 40, 50])
//!     .arrival_rate(vec![100.0])
//!     .generate();
//! let results = run_parallel_experiments(&sets, None).unwrap();
//! let best = smallest_fleet_meeting_target(&results, &sets, 60_000.0);
//! ```

pub mod driver;
pub mod export;
pub mod live;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use driver::run_with_profile;
pub use export::{export_to_csv, export_to_json, smallest_fleet_meeting_target};
pub use live::{ControlAction, LiveConfig, LiveDriver, ScriptedAction};
pub use metrics::SimulationResult;
pub use parameters::{load_scenario_params, ParameterSet, ParameterSpace};
pub use runner::run_parallel_experiments;
