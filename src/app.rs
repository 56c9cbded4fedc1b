//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the stderr logger
//! - runs the Monte Carlo or Bayesian pipeline
//! - prints the text/JSON summary and the histogram

use std::io::Write;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{BayesArgs, Command, OutputArgs, SimulateArgs};
use crate::domain::{BayesConfig, DelayEvent, PlotSettings, SimulateConfig, SimulationParameters};
use crate::error::{AppError, ErrorKind};
use crate::plot::{commute_markers, render_histogram};

pub mod pipeline;

/// Entry point for the `commute` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the normal case.
    dotenvy::dotenv().ok();

    // We want `commute` and `commute --trials 500` to behave like
    // `commute simulate ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    setup_logging(cli.verbose);

    match cli.command {
        Command::Simulate(args) => handle_simulate(&args, cli.seed),
        Command::Bayes(args) => handle_bayes(&args, cli.seed),
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    // Only fails if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn handle_simulate(args: &SimulateArgs, seed: u64) -> Result<(), AppError> {
    let config = simulate_config_from_args(args, seed);
    let run = pipeline::run_simulation(&config)?;

    if config.json {
        return emit(&crate::report::simulation_json(&config, &run)?);
    }

    let mut out = crate::report::format_simulation_summary(&config, &run);
    if config.plot.enabled {
        let markers = commute_markers(run.summary.mean, config.params.late_threshold);
        out.push_str(&render_histogram(
            run.sample.values(),
            config.plot.bins,
            config.plot.width,
            config.plot.height,
            &markers,
        ));
    }
    emit(&out)
}

fn handle_bayes(args: &BayesArgs, seed: u64) -> Result<(), AppError> {
    let config = bayes_config_from_args(args, seed);
    let run = pipeline::run_bayes(&config)?;

    if config.json {
        return emit(&crate::report::bayes_json(&config, &run)?);
    }

    let mut out = crate::report::format_bayes_summary(&config, &run);
    if config.plot.enabled {
        let markers = commute_markers(run.summary.mean, config.late_threshold);
        out.push_str(&render_histogram(
            run.posterior.sample.values(),
            config.plot.bins,
            config.plot.width,
            config.plot.height,
            &markers,
        ));
    }
    emit(&out)
}

fn emit(text: &str) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write output: {e}")))
}

fn plot_settings(output: &OutputArgs) -> PlotSettings {
    PlotSettings {
        enabled: !output.no_plot && !output.json,
        bins: output.bins,
        width: output.width,
        height: output.height,
    }
}

pub fn simulate_config_from_args(args: &SimulateArgs, seed: u64) -> SimulateConfig {
    let mut params = SimulationParameters::new(args.mean, args.stddev, args.trials);
    params.late_threshold = args.late_threshold;
    // clap enforces that both event flags come together.
    if let (Some(probability), Some(delay)) = (args.event_probability, args.event_delay) {
        params.event = Some(DelayEvent { probability, delay });
    }

    SimulateConfig {
        params,
        seed,
        plot: plot_settings(&args.output),
        json: args.output.json,
    }
}

pub fn bayes_config_from_args(args: &BayesArgs, seed: u64) -> BayesConfig {
    BayesConfig {
        known_mean: args.mean,
        prior_mean: args.prior_mean,
        prior_std: args.prior_std,
        observed_count: args.observed,
        pool_count: args.pool,
        grid_max: args.grid_max,
        grid_steps: args.grid_steps,
        draw_count: args.draws,
        likelihood: args.likelihood,
        late_threshold: args.late_threshold,
        seed,
        plot: plot_settings(&args.output),
        json: args.output.json,
    }
}

/// Rewrite argv so `commute` defaults to `commute simulate`.
///
/// Rules:
/// - `commute`                           -> `commute simulate`
/// - `commute --trials 500 ...`          -> `commute simulate --trials 500 ...`
/// - `commute --help/--version/-h`       -> unchanged (show top-level help/version)
/// - any argv that names a subcommand    -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("simulate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let names_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "simulate" | "bayes"));
    if names_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "simulate flags".
    if arg1.starts_with('-') {
        argv.insert(1, "simulate".to_string());
        return argv;
    }

    // Otherwise, leave as-is and let clap report the problem.
    argv
}
