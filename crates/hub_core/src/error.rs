//! Errors reported by the control surface and scenario construction.
//!
//! None of these are fatal: each is returned to the caller before any state is
//! mutated, so the previous configuration stays in effect. An exhausted event
//! queue is not an error at all; `step` simply reports that nothing ran.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ControlError {
    #[error("no idle vehicle available to remove")]
    NoIdleVehicle,

    #[error("arrival rate must be a positive number of requests per minute, got {0}")]
    InvalidRate(f64),

    #[error("vehicle speed must be positive, got {0}")]
    InvalidSpeed(f64),

    #[error("service radius must be positive, got {0}")]
    InvalidRadius(f64),
}

pub type ControlResult<T> = Result<T, ControlError>;

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub fn validate_rate(rate_per_minute: f64) -> ControlResult<f64> {
    if is_positive(rate_per_minute) {
        Ok(rate_per_minute)
    } else {
        Err(ControlError::InvalidRate(rate_per_minute))
    }
}

pub fn validate_speed(speed: f64) -> ControlResult<f64> {
    if is_positive(speed) {
        Ok(speed)
    } else {
        Err(ControlError::InvalidSpeed(speed))
    }
}

pub fn validate_radius(radius: f64) -> ControlResult<f64> {
    if is_positive(radius) {
        Ok(radius)
    } else {
        Err(ControlError::InvalidRadius(radius))
    }
}
