pub mod clock;
pub mod control;
pub mod demand;
pub mod dispatch;
pub mod ecs;
pub mod error;
pub mod fleet;
pub mod profile;
pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
