//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - simulation inputs (`SimulationParameters`, `DelayEvent`)
//! - frozen sample sets (`Sample`) and the Bayesian grid types
//!   (`CandidateGrid`, `PosteriorWeights`)
//! - derived outputs (`SummaryStatistics`) and per-command run configs

pub mod types;

pub use types::*;
