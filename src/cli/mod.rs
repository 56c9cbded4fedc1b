//! Command-line parsing for the commute simulator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the simulation/inference code.

use clap::{Args, Parser, Subcommand};

use crate::domain::LikelihoodForm;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "commute",
    version,
    about = "Commute arrival-time estimation under layered uncertainty"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Random seed. Identical seeds and parameters reproduce a run exactly.
    #[arg(long, global = true, env = "COMMUTE_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Verbose logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Monte Carlo simulation of commute times (optionally with a delay event).
    Simulate(SimulateArgs),
    /// Bayesian estimate that accounts for uncertainty in the variability.
    Bayes(BayesArgs),
}

/// Options for `commute simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Average commute time (minutes).
    #[arg(long, default_value_t = 30.0)]
    pub mean: f64,

    /// Commute variability as a standard deviation (minutes).
    #[arg(long, default_value_t = 5.0)]
    pub stddev: f64,

    /// Number of simulated commutes.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub trials: usize,

    /// Arrivals strictly above this time (minutes) count as late.
    #[arg(long)]
    pub late_threshold: Option<f64>,

    /// Probability of a delay event (e.g. bridge closure) on each commute.
    #[arg(long, requires = "event_delay")]
    pub event_probability: Option<f64>,

    /// Minutes added when the delay event happens.
    #[arg(long, requires = "event_probability")]
    pub event_delay: Option<f64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for `commute bayes`.
#[derive(Debug, Parser, Clone)]
pub struct BayesArgs {
    /// Average commute time (minutes), assumed known.
    #[arg(long, default_value_t = 30.0)]
    pub mean: f64,

    /// Prior mean of the variability (minutes).
    #[arg(long, default_value_t = 5.0)]
    pub prior_mean: f64,

    /// Prior standard deviation of the variability (minutes).
    #[arg(long, default_value_t = 2.0)]
    pub prior_std: f64,

    /// Number of observed commutes.
    #[arg(long, default_value_t = 100)]
    pub observed: usize,

    /// Number of simulated commutes in the resampling pool.
    #[arg(long, default_value_t = 100)]
    pub pool: usize,

    /// Upper bound of the variability grid; the grid covers (0, grid-max].
    #[arg(long, default_value_t = 10.0)]
    pub grid_max: f64,

    /// Number of grid points.
    #[arg(long, default_value_t = 100)]
    pub grid_steps: usize,

    /// Number of posterior-predictive draws.
    #[arg(long, default_value_t = 100)]
    pub draws: usize,

    /// Likelihood used to weight the grid.
    #[arg(long, value_enum, default_value_t = LikelihoodForm::Kernel)]
    pub likelihood: LikelihoodForm,

    /// Arrivals strictly above this time (minutes) count as late.
    #[arg(long)]
    pub late_threshold: Option<f64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output options shared by both commands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Disable the terminal histogram.
    #[arg(long)]
    pub no_plot: bool,

    /// Histogram bins.
    #[arg(long, default_value_t = 20)]
    pub bins: usize,

    /// Histogram width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Histogram height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Print the summary as JSON instead of text (implies no histogram).
    #[arg(long)]
    pub json: bool,
}
