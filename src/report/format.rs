//! Formatted terminal output for both commands.
//!
//! We keep formatting code in one place so:
//! - the simulation/posterior code stays free of presentation concerns
//! - output changes are localized (important for snapshot tests)

use serde::Serialize;

use crate::app::pipeline::BayesRun;
use crate::domain::{
    BayesConfig, LikelihoodForm, SimulateConfig, SimulationParameters, SummaryStatistics,
};
use crate::error::{AppError, ErrorKind};
use crate::sim::SimulationRun;

#[derive(Debug, Serialize)]
struct SimulationReport<'a> {
    seed: u64,
    parameters: &'a SimulationParameters,
    summary: &'a SummaryStatistics,
}

#[derive(Debug, Serialize)]
struct BayesReport {
    seed: u64,
    known_mean: f64,
    prior_mean: f64,
    prior_std: f64,
    likelihood: LikelihoodForm,
    observed_count: usize,
    pool_count: usize,
    grid_max: f64,
    grid_steps: usize,
    draw_count: usize,
    hidden_variability: f64,
    map_variability: f64,
    posterior_mean_variability: f64,
    summary: SummaryStatistics,
}

/// Text summary of a Monte Carlo run.
pub fn format_simulation_summary(config: &SimulateConfig, run: &SimulationRun) -> String {
    let p = &config.params;
    let mut out = String::new();

    out.push_str("=== commute - Monte Carlo commute simulation ===\n");
    out.push_str(&format!("Seed: {}\n", config.seed));
    out.push_str(&format!(
        "Parameters: mean={:.2} min | stddev={:.2} min | trials={}\n",
        p.mean, p.stddev, p.trial_count
    ));
    if let Some(event) = &p.event {
        out.push_str(&format!(
            "Event: p={:.3} | delay={:.2} min\n",
            event.probability, event.delay
        ));
    }
    if let Some(t) = p.late_threshold {
        out.push_str(&format!("Late threshold: {t:.2} min\n"));
    }

    out.push('\n');
    out.push_str(&format!(
        "Estimated average arrival time: {:.2} minutes\n",
        run.summary.mean
    ));
    out.push_str(&format!("Standard deviation: {:.2} minutes\n", run.summary.stddev));
    if let Some(late) = run.summary.late_percentage {
        out.push_str(&format!("Late arrivals: {late:.2}%\n"));
    }
    out.push('\n');

    out
}

/// Text summary of a Bayesian run.
pub fn format_bayes_summary(config: &BayesConfig, run: &BayesRun) -> String {
    let mut out = String::new();

    out.push_str("=== commute - Bayesian commute estimate ===\n");
    out.push_str(&format!("Seed: {}\n", config.seed));
    out.push_str(&format!("Known average time: {:.2} min\n", config.known_mean));
    out.push_str(&format!(
        "Variability prior: mean={:.2} | std={:.2}\n",
        config.prior_mean, config.prior_std
    ));
    out.push_str(&format!(
        "Observed: n={} | Pool: n={} (hidden variability={:.2})\n",
        run.observed.len(),
        run.pool.len(),
        run.hidden_variability
    ));
    out.push_str(&format!(
        "Grid: {} points over (0, {:.2}] | Draws: {}\n",
        run.grid.len(),
        config.grid_max,
        run.posterior.sample.len()
    ));
    out.push_str(&format!(
        "Likelihood: {}\n",
        match config.likelihood {
            LikelihoodForm::Kernel => "kernel (unnormalized, no sigma^-n term)",
            LikelihoodForm::Scaled => "scaled (kernel x sigma^-n)",
        }
    ));

    out.push('\n');
    out.push_str(&format!(
        "Posterior variability: MAP={:.2} | mean={:.2}\n",
        run.posterior.weights.map_value(&run.grid),
        run.posterior.weights.mean_value(&run.grid)
    ));
    out.push_str(&format!(
        "Estimated average arrival time (considering uncertainty in variability): {:.2} minutes\n",
        run.summary.mean
    ));
    out.push_str(&format!(
        "Uncertainty in arrival time (standard deviation): {:.2} minutes\n",
        run.summary.stddev
    ));
    if let Some(late) = run.summary.late_percentage {
        out.push_str(&format!("Late arrivals: {late:.2}%\n"));
    }
    out.push('\n');

    out
}

/// JSON summary of a Monte Carlo run.
pub fn simulation_json(config: &SimulateConfig, run: &SimulationRun) -> Result<String, AppError> {
    to_json(&SimulationReport {
        seed: config.seed,
        parameters: &config.params,
        summary: &run.summary,
    })
}

/// JSON summary of a Bayesian run.
pub fn bayes_json(config: &BayesConfig, run: &BayesRun) -> Result<String, AppError> {
    to_json(&BayesReport {
        seed: config.seed,
        known_mean: config.known_mean,
        prior_mean: config.prior_mean,
        prior_std: config.prior_std,
        likelihood: config.likelihood,
        observed_count: run.observed.len(),
        pool_count: run.pool.len(),
        grid_max: config.grid_max,
        grid_steps: run.grid.len(),
        draw_count: run.posterior.sample.len(),
        hidden_variability: run.hidden_variability,
        map_variability: run.posterior.weights.map_value(&run.grid),
        posterior_mean_variability: run.posterior.weights.mean_value(&run.grid),
        summary: run.summary,
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    let mut text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to encode report: {e}")))?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DelayEvent, PlotSettings};

    fn simulate_config() -> SimulateConfig {
        SimulateConfig {
            params: SimulationParameters::new(60.0, 30.0, 500)
                .with_late_threshold(75.0)
                .with_event(DelayEvent::new(0.1, 5.0).unwrap()),
            seed: 7,
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
    fn simulation_summary_lists_inputs_and_results() {
        let config = simulate_config();
        let run = crate::sim::run(&config.params, config.seed).unwrap();
        let txt = format_simulation_summary(&config, &run);

        assert!(txt.contains("Seed: 7\n"));
        assert!(txt.contains("Parameters: mean=60.00 min | stddev=30.00 min | trials=500\n"));
        assert!(txt.contains("Event: p=0.100 | delay=5.00 min\n"));
        assert!(txt.contains("Late threshold: 75.00 min\n"));
        assert!(txt.contains(&format!(
            "Estimated average arrival time: {:.2} minutes\n",
            run.summary.mean
        )));
        assert!(txt.contains("Late arrivals: "));
    }

    #[test]
    fn simulation_json_round_trips_through_value() {
        let config = simulate_config();
        let run = crate::sim::run(&config.params, config.seed).unwrap();
        let json = simulation_json(&config, &run).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["seed"], 7);
        assert_eq!(value["parameters"]["trial_count"], 500);
        assert_eq!(value["parameters"]["event"]["delay"], 5.0);
        assert_eq!(
            value["summary"]["late_percentage"].as_f64(),
            run.summary.late_percentage
        );
    }
}
