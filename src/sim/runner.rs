//! Orchestrates N independent trials.
//!
//! Trials are split into fixed-size blocks. Each block owns its own
//! `VariateGenerator` seeded from `(seed, block index)`, blocks are evaluated
//! on the rayon pool, and the per-block vectors are concatenated in block
//! order once every worker is done. No trial reads anything another trial
//! wrote, and the output for a seed does not depend on the thread count.

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{Sample, SimulationParameters, SummaryStatistics};
use crate::error::AppError;
use crate::sim::event::Perturbation;
use crate::sim::variate::{VariateGenerator, stream_seed};
use crate::stats::summarize;

/// Number of consecutive trials that share one random stream.
pub const TRIALS_PER_STREAM: usize = 4096;

/// Output of a single Monte Carlo run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub sample: Sample,
    pub summary: SummaryStatistics,
}

/// Run the simulation described by `params`, using the event it configures.
pub fn run(params: &SimulationParameters, seed: u64) -> Result<SimulationRun, AppError> {
    let perturbation = params.event.as_ref().map(|e| e as &dyn Perturbation);
    run_with(params, seed, perturbation)
}

/// Run the simulation with an explicit perturbation step.
///
/// `params.event` is ignored here; the caller decides what (if anything)
/// adjusts each trial.
pub fn run_with(
    params: &SimulationParameters,
    seed: u64,
    perturbation: Option<&dyn Perturbation>,
) -> Result<SimulationRun, AppError> {
    params.validate()?;

    let values = draw_trials(
        params.mean,
        params.stddev,
        params.trial_count,
        seed,
        perturbation,
    )?;
    let sample = Sample::new(values)?;
    let summary = summarize(sample.values(), params.late_threshold)?;

    Ok(SimulationRun { sample, summary })
}

/// Draw `count` independent trials from `N(mean, stddev)`, each optionally
/// adjusted by `perturbation`.
pub fn draw_trials(
    mean: f64,
    stddev: f64,
    count: usize,
    seed: u64,
    perturbation: Option<&dyn Perturbation>,
) -> Result<Vec<f64>, AppError> {
    if count == 0 {
        return Err(AppError::invalid("Trial count must be > 0."));
    }

    let blocks = count.div_ceil(TRIALS_PER_STREAM);
    let chunks: Vec<Vec<f64>> = (0..blocks)
        .into_par_iter()
        .map(|block| -> Result<Vec<f64>, AppError> {
            let start = block * TRIALS_PER_STREAM;
            let len = TRIALS_PER_STREAM.min(count - start);
            let mut generator = VariateGenerator::seeded(stream_seed(seed, block as u64));

            let mut out = Vec::with_capacity(len);
            for _ in 0..len {
                let mut t = generator.draw(mean, stddev)?;
                if let Some(p) = perturbation {
                    t = p.perturb(t, &mut generator);
                }
                out.push(t);
            }
            Ok(out)
        })
        .collect::<Result<_, _>>()?;

    Ok(chunks.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DelayEvent;

    #[test]
    fn sample_length_matches_trial_count() {
        for n in [1, 7, 100, TRIALS_PER_STREAM, TRIALS_PER_STREAM + 1, 10_000] {
            let out = run(&SimulationParameters::new(30.0, 5.0, n), 11).unwrap();
            assert_eq!(out.sample.len(), n);
        }
    }

    #[test]
    fn zero_stddev_without_event_is_constant() {
        let out = run(&SimulationParameters::new(30.0, 0.0, 500), 5).unwrap();
        assert!(out.sample.values().iter().all(|&v| v == 30.0));
        assert_eq!(out.summary.stddev, 0.0);
    }

    #[test]
    fn zero_trials_is_invalid() {
        let err = run(&SimulationParameters::new(30.0, 5.0, 0), 5).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn single_trial_has_zero_stddev() {
        let out = run(&SimulationParameters::new(30.0, 5.0, 1), 5).unwrap();
        assert_eq!(out.sample.len(), 1);
        assert_eq!(out.summary.stddev, 0.0);
    }

    #[test]
    fn same_seed_is_bit_for_bit_reproducible() {
        let params = SimulationParameters::new(30.0, 5.0, 100);
        let a = run(&params, 42).unwrap();
        let b = run(&params, 42).unwrap();
        assert_eq!(a.sample, b.sample);
        assert!(a.summary.mean >= 28.0 && a.summary.mean <= 32.0, "mean={}", a.summary.mean);

        let c = run(&params, 43).unwrap();
        assert_ne!(a.sample, c.sample);
    }

    #[test]
    fn longer_runs_extend_shorter_ones() {
        let params_short = SimulationParameters::new(30.0, 5.0, TRIALS_PER_STREAM + 1);
        let params_long = SimulationParameters::new(30.0, 5.0, 3 * TRIALS_PER_STREAM);
        let short = run(&params_short, 8).unwrap();
        let long = run(&params_long, 8).unwrap();
        assert_eq!(short.sample.values(), &long.sample.values()[..short.sample.len()]);
    }

    #[test]
    fn mean_converges_for_large_runs() {
        let out = run(&SimulationParameters::new(30.0, 5.0, 100_000), 2024).unwrap();
        assert!((out.summary.mean - 30.0).abs() < 0.5, "mean={}", out.summary.mean);
    }

    #[test]
    fn late_rate_with_bridge_closure() {
        let params = SimulationParameters::new(60.0, 30.0, 500)
            .with_late_threshold(75.0)
            .with_event(DelayEvent::new(0.1, 5.0).unwrap());
        let out = run(&params, 7).unwrap();
        let late = out.summary.late_percentage.unwrap();
        assert!((20.0..=45.0).contains(&late), "late={late}");
    }

    #[test]
    fn unreachable_threshold_gives_zero_late_rate() {
        let params = SimulationParameters::new(30.0, 0.0, 50).with_late_threshold(30.0);
        let out = run(&params, 1).unwrap();
        assert_eq!(out.summary.late_percentage, Some(0.0));
    }

    #[test]
    fn certain_event_shifts_every_trial() {
        let params = SimulationParameters::new(30.0, 0.0, 20)
            .with_event(DelayEvent::new(1.0, 12.0).unwrap());
        let out = run(&params, 3).unwrap();
        assert!(out.sample.values().iter().all(|&v| v == 42.0));
    }

    struct Shift(f64);

    impl Perturbation for Shift {
        fn perturb(&self, value: f64, _generator: &mut VariateGenerator) -> f64 {
            value + self.0
        }
    }

    #[test]
    fn custom_perturbation_replaces_event_model() {
        let params = SimulationParameters::new(10.0, 0.0, 8)
            .with_event(DelayEvent::new(1.0, 100.0).unwrap());
        let out = run_with(&params, 3, Some(&Shift(2.5))).unwrap();
        assert!(out.sample.values().iter().all(|&v| v == 12.5));
    }
}
