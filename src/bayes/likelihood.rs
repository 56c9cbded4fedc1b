//! Likelihood of an observed sample under a candidate variability.
//!
//! The default kernel is
//!
//! ```text
//! L(σ) = exp(-0.5 Σ_i ((x_i - μ) / σ)^2)
//! ```
//!
//! It is **unnormalized**: the `1 / (σ √(2π))^n` factor of the Gaussian
//! density is dropped. Values are only meaningful relative to other
//! candidates on the same grid and must not be read as densities. Note that
//! without the `σ^-n` term the kernel grows with σ for any fixed data.
//!
//! [`LikelihoodForm::Scaled`] puts `σ^-n` back (still without `(2π)^-n/2`,
//! which is identical for every candidate), which makes the curve peak at the
//! root-mean-square deviation of the data from `μ`.

use crate::domain::{LikelihoodForm, Sample};
use crate::error::AppError;

/// Unnormalized Gaussian kernel likelihood of `observed` at `sigma`.
pub fn likelihood(sigma: f64, observed: &Sample, known_mean: f64) -> Result<f64, AppError> {
    likelihood_with(LikelihoodForm::Kernel, sigma, observed, known_mean)
}

/// Likelihood of `observed` at `sigma` under the chosen form.
pub fn likelihood_with(
    form: LikelihoodForm,
    sigma: f64,
    observed: &Sample,
    known_mean: f64,
) -> Result<f64, AppError> {
    Ok(log_likelihood_with(form, sigma, observed, known_mean)?.exp())
}

/// Natural log of [`likelihood_with`].
///
/// Stays finite where the likelihood itself underflows to 0, so candidates
/// can still be compared relative to each other.
pub fn log_likelihood_with(
    form: LikelihoodForm,
    sigma: f64,
    observed: &Sample,
    known_mean: f64,
) -> Result<f64, AppError> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(AppError::invalid(format!(
            "Candidate variability must be finite and > 0 (got {sigma})."
        )));
    }
    if !known_mean.is_finite() {
        return Err(AppError::invalid(format!(
            "Known mean must be finite (got {known_mean})."
        )));
    }

    let sum_sq: f64 = observed
        .values()
        .iter()
        .map(|x| {
            let z = (x - known_mean) / sigma;
            z * z
        })
        .sum();

    Ok(match form {
        LikelihoodForm::Kernel => -0.5 * sum_sq,
        LikelihoodForm::Scaled => -0.5 * sum_sq - observed.len() as f64 * sigma.ln(),
    })
}
