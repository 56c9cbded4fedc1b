//! Shared domain types.
//!
//! Everything here is value-like: built once, validated at construction, and
//! never mutated afterwards. Types that end up in reports derive `Serialize`
//! so the JSON output is just a projection of what the core computed.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A single discrete risk factor superimposed on every trial.
///
/// With `probability`, `delay` minutes are added to the drawn commute time
/// (e.g. a bridge closure).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayEvent {
    pub probability: f64,
    pub delay: f64,
}

impl DelayEvent {
    pub fn new(probability: f64, delay: f64) -> Result<Self, AppError> {
        let event = Self { probability, delay };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_probability(self.probability)?;
        if !self.delay.is_finite() {
            return Err(AppError::invalid(format!(
                "Event delay must be finite (got {}).",
                self.delay
            )));
        }
        Ok(())
    }
}

fn validate_probability(p: f64) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(AppError::invalid(format!(
            "Event probability must lie in [0, 1] (got {p})."
        )));
    }
    Ok(())
}

/// Inputs of a single Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Average commute time (minutes).
    pub mean: f64,
    /// Commute variability (minutes). Zero degenerates every draw to `mean`.
    pub stddev: f64,
    pub trial_count: usize,
    /// Trials strictly above this value count as late arrivals.
    pub late_threshold: Option<f64>,
    pub event: Option<DelayEvent>,
}

impl SimulationParameters {
    pub fn new(mean: f64, stddev: f64, trial_count: usize) -> Self {
        Self {
            mean,
            stddev,
            trial_count,
            late_threshold: None,
            event: None,
        }
    }

    pub fn with_late_threshold(mut self, threshold: f64) -> Self {
        self.late_threshold = Some(threshold);
        self
    }

    pub fn with_event(mut self, event: DelayEvent) -> Self {
        self.event = Some(event);
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.mean.is_finite() {
            return Err(AppError::invalid(format!(
                "Mean must be finite (got {}).",
                self.mean
            )));
        }
        if !(self.stddev.is_finite() && self.stddev >= 0.0) {
            return Err(AppError::invalid(format!(
                "Standard deviation must be finite and >= 0 (got {}).",
                self.stddev
            )));
        }
        if self.trial_count == 0 {
            return Err(AppError::invalid("Trial count must be > 0."));
        }
        if let Some(t) = self.late_threshold {
            if !t.is_finite() {
                return Err(AppError::invalid(format!(
                    "Late threshold must be finite (got {t})."
                )));
            }
        }
        if let Some(event) = &self.event {
            event.validate()?;
        }
        Ok(())
    }
}

/// A frozen, non-empty set of commute outcomes.
///
/// Element order carries no meaning, but it is preserved so that a seeded run
/// is reproducible element by element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sample(Vec<f64>);

impl Sample {
    pub fn new(values: Vec<f64>) -> Result<Self, AppError> {
        if values.is_empty() {
            return Err(AppError::invalid("Sample must contain at least one value."));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::invalid("Sample contains a non-finite value."));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strictly increasing, strictly positive candidate values for the
/// variability parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateGrid(Vec<f64>);

impl CandidateGrid {
    pub fn new(values: Vec<f64>) -> Result<Self, AppError> {
        if values.is_empty() {
            return Err(AppError::invalid("Candidate grid is empty."));
        }
        if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(AppError::invalid(format!(
                "Candidate grid values must be finite and > 0 (got {bad})."
            )));
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AppError::invalid("Candidate grid must be strictly increasing."));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Probability mass over `CandidateGrid` positions (sums to 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PosteriorWeights(Vec<f64>);

impl PosteriorWeights {
    /// Wrap weights that the caller has already normalized.
    pub(crate) fn from_normalized(weights: Vec<f64>) -> Self {
        Self(weights)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the highest weight. Ties resolve to the lowest index.
    pub fn map_index(&self) -> usize {
        let mut best = 0;
        for (i, &w) in self.0.iter().enumerate().skip(1) {
            if w > self.0[best] {
                best = i;
            }
        }
        best
    }

    /// Grid value carrying the most posterior mass.
    pub fn map_value(&self, grid: &CandidateGrid) -> f64 {
        grid.values()[self.map_index()]
    }

    /// Posterior mean of the parameter over the grid.
    pub fn mean_value(&self, grid: &CandidateGrid) -> f64 {
        grid.values()
            .iter()
            .zip(self.0.iter())
            .map(|(v, w)| v * w)
            .sum()
    }
}

/// Reportable summary of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub mean: f64,
    /// Population standard deviation (divides by `n`).
    pub stddev: f64,
    /// Share of values strictly above the late threshold, as a percentage
    /// rounded to two decimals. `None` when no threshold was given.
    pub late_percentage: Option<f64>,
}

/// Which likelihood kernel scores a candidate variability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LikelihoodForm {
    /// `exp(-0.5 Σ ((x - μ) / σ)^2)` with no normalizing constant.
    Kernel,
    /// The kernel multiplied by `σ^-n`. The `(2π)^-n/2` factor is still
    /// omitted since it is the same for every candidate.
    Scaled,
}

/// Histogram rendering settings shared by both commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSettings {
    pub enabled: bool,
    pub bins: usize,
    pub width: usize,
    pub height: usize,
}

/// Everything the `simulate` command needs.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub params: SimulationParameters,
    pub seed: u64,
    pub plot: PlotSettings,
    pub json: bool,
}

/// Everything the `bayes` command needs.
#[derive(Debug, Clone)]
pub struct BayesConfig {
    /// Average commute time, assumed known.
    pub known_mean: f64,
    /// Prior belief about the variability: centre of the hidden draw.
    pub prior_mean: f64,
    /// Prior spread; also the scale of the observed data.
    pub prior_std: f64,
    pub observed_count: usize,
    pub pool_count: usize,
    pub grid_max: f64,
    pub grid_steps: usize,
    pub draw_count: usize,
    pub likelihood: LikelihoodForm,
    pub late_threshold: Option<f64>,
    pub seed: u64,
    pub plot: PlotSettings,
    pub json: bool,
}
