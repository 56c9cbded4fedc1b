//! Shared run logic used by the CLI front-end.
//!
//! Keeping this in one place avoids mixing the core workflow with printing:
//! - Monte Carlo: parameters -> trials -> summary
//! - Bayesian: observed sample + hidden variability -> pool -> grid posterior
//!   -> posterior-predictive sample -> summary
//!
//! The CLI can then focus on presentation (text, JSON, histogram).

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bayes::{PosteriorPredictive, positive_lin_space, posterior_predictive};
use crate::domain::{
    BayesConfig, CandidateGrid, Sample, SimulateConfig, SimulationParameters, SummaryStatistics,
};
use crate::error::AppError;
use crate::sim::{SimulationRun, VariateGenerator, run, stream_seed};
use crate::stats::summarize;

// Sub-streams of the run seed used by the Bayesian pipeline.
const OBSERVED_STREAM: u64 = 0;
const HIDDEN_STREAM: u64 = 1;
const POOL_STREAM: u64 = 2;
const RESAMPLE_STREAM: u64 = 3;

/// All computed outputs of a single `commute bayes` run.
#[derive(Debug, Clone, Serialize)]
pub struct BayesRun {
    pub observed: Sample,
    /// Variability the pool was generated with (unknown to the inference).
    pub hidden_variability: f64,
    pub pool: Sample,
    pub grid: CandidateGrid,
    pub posterior: PosteriorPredictive,
    pub summary: SummaryStatistics,
}

/// Execute a Monte Carlo run.
pub fn run_simulation(config: &SimulateConfig) -> Result<SimulationRun, AppError> {
    let p = &config.params;
    info!(
        mean = p.mean,
        stddev = p.stddev,
        trials = p.trial_count,
        seed = config.seed,
        "starting Monte Carlo simulation"
    );

    let out = run(p, config.seed)?;

    info!(
        mean = out.summary.mean,
        stddev = out.summary.stddev,
        late_percentage = ?out.summary.late_percentage,
        "simulation finished"
    );
    Ok(out)
}

/// Execute the Bayesian pipeline.
pub fn run_bayes(config: &BayesConfig) -> Result<BayesRun, AppError> {
    info!(
        known_mean = config.known_mean,
        prior_mean = config.prior_mean,
        prior_std = config.prior_std,
        seed = config.seed,
        "starting Bayesian estimate"
    );

    // 1) Observed commutes. Their scale is the prior spread.
    let observed_params =
        SimulationParameters::new(config.known_mean, config.prior_std, config.observed_count);
    let observed = run(&observed_params, stream_seed(config.seed, OBSERVED_STREAM))?.sample;

    // 2) Hidden variability, drawn from the prior.
    let hidden_variability = draw_hidden_variability(config)?;

    // 3) Pool of simulated commutes under the hidden variability.
    let pool_params =
        SimulationParameters::new(config.known_mean, hidden_variability, config.pool_count);
    let pool = run(&pool_params, stream_seed(config.seed, POOL_STREAM))?.sample;

    // 4) Grid posterior and posterior-predictive resampling.
    let grid = positive_lin_space(config.grid_max, config.grid_steps)?;
    debug!(
        observed = observed.len(),
        pool = pool.len(),
        grid = grid.len(),
        draws = config.draw_count,
        "evaluating grid posterior"
    );
    let mut generator = VariateGenerator::seeded(stream_seed(config.seed, RESAMPLE_STREAM));
    let posterior = posterior_predictive(
        &grid,
        &observed,
        config.known_mean,
        &pool,
        config.draw_count,
        config.likelihood,
        &mut generator,
    )?;

    // 5) Summarize the posterior-predictive sample.
    let summary = summarize(posterior.sample.values(), config.late_threshold)?;

    info!(
        map_variability = posterior.weights.map_value(&grid),
        mean = summary.mean,
        stddev = summary.stddev,
        "Bayesian estimate finished"
    );

    Ok(BayesRun {
        observed,
        hidden_variability,
        pool,
        grid,
        posterior,
        summary,
    })
}

/// Draw the hidden variability from `N(prior_mean, prior_std)`.
///
/// A non-positive draw is folded to its absolute value (or the smallest
/// positive float for an exact zero) so the pool always has a valid spread.
fn draw_hidden_variability(config: &BayesConfig) -> Result<f64, AppError> {
    let mut generator = VariateGenerator::seeded(stream_seed(config.seed, HIDDEN_STREAM));
    let raw = generator.draw(config.prior_mean, config.prior_std)?;
    if raw > 0.0 {
        return Ok(raw);
    }

    let folded = raw.abs().max(f64::MIN_POSITIVE);
    warn!(raw, folded, "hidden variability draw was not positive; folded");
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LikelihoodForm, PlotSettings};
    use crate::error::ErrorKind;

    fn bayes_config() -> BayesConfig {
        BayesConfig {
            known_mean: 30.0,
            prior_mean: 5.0,
            prior_std: 2.0,
            observed_count: 100,
            pool_count: 100,
            grid_max: 10.0,
            grid_steps: 100,
            draw_count: 100,
            likelihood: LikelihoodForm::Kernel,
            late_threshold: None,
            seed: 42,
            plot: PlotSettings {
                enabled: false,
                bins: 20,
                width: 80,
                height: 10,
            },
            json: false,
        }
    }

    #[test]
    fn bayes_run_has_requested_sizes() {
        let config = bayes_config();
        let out = run_bayes(&config).unwrap();
        assert_eq!(out.observed.len(), 100);
        assert_eq!(out.pool.len(), 100);
        assert_eq!(out.grid.len(), 100);
        assert_eq!(out.posterior.sample.len(), 100);
        assert!(out.hidden_variability > 0.0);

        let total: f64 = out.posterior.weights.as_slice().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((out.summary.mean - 30.0).abs() < 5.0);
    }

    #[test]
    fn bayes_run_is_reproducible() {
        let config = bayes_config();
        let a = run_bayes(&config).unwrap();
        let b = run_bayes(&config).unwrap();
        assert_eq!(a.posterior.sample, b.posterior.sample);
        assert_eq!(a.hidden_variability, b.hidden_variability);
    }

    #[test]
    fn scaled_form_and_late_threshold_flow_through() {
        let mut config = bayes_config();
        config.likelihood = LikelihoodForm::Scaled;
        config.late_threshold = Some(35.0);
        let out = run_bayes(&config).unwrap();
        let map = out.posterior.weights.map_value(&out.grid);
        assert!((map - 2.0).abs() < 0.5, "map={map}");
        assert!(out.summary.late_percentage.is_some());
    }

    #[test]
    fn scaled_form_handles_several_hundred_observations() {
        let mut config = bayes_config();
        config.likelihood = LikelihoodForm::Scaled;
        config.observed_count = 800;
        let out = run_bayes(&config).unwrap();
        let map = out.posterior.weights.map_value(&out.grid);
        assert!((map - 2.0).abs() < 0.3, "map={map}");
    }

    #[test]
    fn non_positive_prior_mean_is_folded() {
        let mut config = bayes_config();
        config.prior_mean = -5.0;
        config.prior_std = 0.0;
        // Observed data then has zero spread, so the kernel is 1 everywhere.
        let out = run_bayes(&config).unwrap();
        assert_eq!(out.hidden_variability, 5.0);
    }

    #[test]
    fn zero_observations_are_invalid() {
        let mut config = bayes_config();
        config.observed_count = 0;
        let err = run_bayes(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn simulation_passes_parameters_through() {
        let config = SimulateConfig {
            params: SimulationParameters::new(30.0, 5.0, 100),
            seed: 42,
            plot: PlotSettings {
                enabled: true,
                bins: 20,
                width: 80,
                height: 10,
            },
            json: false,
        };
        let a = run_simulation(&config).unwrap();
        let b = run(&config.params, config.seed).unwrap();
        assert_eq!(a.sample, b.sample);
    }
}
