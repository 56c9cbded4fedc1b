//! Descriptive statistics over a finite sample.
//!
//! Conventions: arithmetic mean, population standard deviation (divide by
//! `n`), and late-arrival share reported as a percentage rounded to two
//! decimals.

use crate::domain::SummaryStatistics;
use crate::error::AppError;

/// Reduce a sample to its reportable summary.
pub fn summarize(values: &[f64], late_threshold: Option<f64>) -> Result<SummaryStatistics, AppError> {
    let mean = mean(values)?;
    let stddev = population_stddev(values)?;
    let late_percentage = match late_threshold {
        Some(t) => Some(late_percentage(values, t)?),
        None => None,
    };

    Ok(SummaryStatistics {
        mean,
        stddev,
        late_percentage,
    })
}

pub fn mean(values: &[f64]) -> Result<f64, AppError> {
    if values.is_empty() {
        return Err(empty_sample());
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation dividing by `n`. A single value has spread 0.
pub fn population_stddev(values: &[f64]) -> Result<f64, AppError> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Ok(var.sqrt())
}

/// Percentage of values strictly greater than `threshold`.
pub fn late_percentage(values: &[f64], threshold: f64) -> Result<f64, AppError> {
    if values.is_empty() {
        return Err(empty_sample());
    }
    let late = values.iter().filter(|&&v| v > threshold).count();
    Ok(round2(100.0 * late as f64 / values.len() as f64))
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn empty_sample() -> AppError {
    AppError::invalid("Cannot summarize an empty sample.")
}
