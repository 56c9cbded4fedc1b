//! Posterior weights over the grid and posterior-predictive resampling.
//!
//! Steps:
//!
//! 1. score every grid candidate (parallel, order preserved); the scaled form
//!    is scored in log space and rescaled so its best candidate is 1
//! 2. normalize the scores into `PosteriorWeights` (uniform prior)
//! 3. map the weights onto the pool of simulated outcomes
//! 4. draw from the pool with replacement using the mapped weights
//!
//! Step 3 is positional: pool element `j` gets the weight of grid position
//! `j mod grid_len`. The pool is *not* regenerated per candidate, so the
//! result is a weighted bootstrap of one pool rather than an exact
//! posterior-predictive. When the pool and grid differ in length the mapped
//! weights no longer sum to 1; the sampler renormalizes them implicitly.

use rand::distributions::{Distribution, WeightedIndex};
use rayon::prelude::*;
use serde::Serialize;

use crate::bayes::likelihood::{likelihood_with, log_likelihood_with};
use crate::domain::{CandidateGrid, LikelihoodForm, PosteriorWeights, Sample};
use crate::error::AppError;
use crate::sim::variate::VariateGenerator;

/// Everything computed on the way to a posterior-predictive sample.
#[derive(Debug, Clone, Serialize)]
pub struct PosteriorPredictive {
    /// Unnormalized likelihood per grid point, in grid order. For the scaled
    /// form these are relative to the best candidate.
    pub likelihoods: Vec<f64>,
    pub weights: PosteriorWeights,
    pub sample: Sample,
}

/// Likelihood of `observed` at every grid point, in grid order.
///
/// The kernel is evaluated as is and may underflow to all zeros. The scaled
/// form is shifted by its maximum log-likelihood before exponentiating, so
/// the best candidate always scores 1.
pub fn likelihood_vector(
    grid: &CandidateGrid,
    observed: &Sample,
    known_mean: f64,
    form: LikelihoodForm,
) -> Result<Vec<f64>, AppError> {
    match form {
        LikelihoodForm::Kernel => grid
            .values()
            .par_iter()
            .map(|&sigma| likelihood_with(form, sigma, observed, known_mean))
            .collect(),
        LikelihoodForm::Scaled => {
            let logs: Vec<f64> = grid
                .values()
                .par_iter()
                .map(|&sigma| log_likelihood_with(form, sigma, observed, known_mean))
                .collect::<Result<_, _>>()?;
            let peak = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Ok(logs.iter().map(|l| (l - peak).exp()).collect())
        }
    }
}

/// Normalize likelihoods into weights summing to 1.
pub fn normalize(likelihoods: &[f64]) -> Result<PosteriorWeights, AppError> {
    if likelihoods.is_empty() {
        return Err(AppError::invalid("Likelihood vector is empty."));
    }
    if likelihoods.iter().any(|l| !(l.is_finite() && *l >= 0.0)) {
        return Err(AppError::degenerate(
            "Degenerate posterior: a grid candidate's likelihood overflowed or is negative.",
        ));
    }

    let total: f64 = likelihoods.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(AppError::degenerate(
            "Degenerate posterior: every grid candidate has zero likelihood \
             (grid range excludes the data's spread, or the likelihood underflowed).",
        ));
    }

    Ok(PosteriorWeights::from_normalized(
        likelihoods.iter().map(|l| l / total).collect(),
    ))
}

/// Per-element sampling weights for a pool of `pool_len` outcomes.
pub fn pool_weights(weights: &PosteriorWeights, pool_len: usize) -> Vec<f64> {
    let w = weights.as_slice();
    if w.is_empty() {
        return Vec::new();
    }
    (0..pool_len).map(|j| w[j % w.len()]).collect()
}

/// Draw `draw_count` elements of `pool` with replacement.
///
/// Output order is draw order.
pub fn resample(
    pool: &Sample,
    weights: &[f64],
    draw_count: usize,
    generator: &mut VariateGenerator,
) -> Result<Sample, AppError> {
    if draw_count == 0 {
        return Err(AppError::invalid("Draw count must be > 0."));
    }
    if weights.len() != pool.len() {
        return Err(AppError::invalid(format!(
            "Pool has {} elements but {} sampling weights were given.",
            pool.len(),
            weights.len()
        )));
    }

    let index = WeightedIndex::new(weights)
        .map_err(|e| AppError::degenerate(format!("Cannot resample pool: {e}")))?;
    let values = pool.values();
    let draws = (0..draw_count)
        .map(|_| values[index.sample(generator.rng())])
        .collect();
    Sample::new(draws)
}

/// Posterior-predictive sample of commute outcomes given the observed data.
pub fn posterior_predictive(
    grid: &CandidateGrid,
    observed: &Sample,
    known_mean: f64,
    pool: &Sample,
    draw_count: usize,
    form: LikelihoodForm,
    generator: &mut VariateGenerator,
) -> Result<PosteriorPredictive, AppError> {
    let likelihoods = likelihood_vector(grid, observed, known_mean, form)?;
    let weights = normalize(&likelihoods)?;
    let per_element = pool_weights(&weights, pool.len());
    let sample = resample(pool, &per_element, draw_count, generator)?;

    Ok(PosteriorPredictive {
        likelihoods,
        weights,
        sample,
    })
}
