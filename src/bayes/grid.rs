//! Candidate grid generation.
//!
//! The variability is inferred over a deterministic, finite grid instead of
//! being sampled. The grid never contains 0: the likelihood divides by the
//! candidate.

use crate::domain::CandidateGrid;
use crate::error::AppError;

/// `steps` evenly spaced points over `(0, max]`: `max/steps, 2·max/steps, …, max`.
pub fn positive_lin_space(max: f64, steps: usize) -> Result<CandidateGrid, AppError> {
    if !(max.is_finite() && max > 0.0) {
        return Err(AppError::invalid(format!(
            "Grid upper bound must be finite and > 0 (got {max})."
        )));
    }
    if steps == 0 {
        return Err(AppError::invalid("Grid steps must be >= 1."));
    }

    let values = (1..=steps).map(|i| max * i as f64 / steps as f64).collect();
    CandidateGrid::new(values)
}
