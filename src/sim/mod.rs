//! Monte Carlo simulation of commute outcomes.
//!
//! Responsibilities:
//!
//! - seeded normal variates (`variate`)
//! - discrete events layered on top of a draw (`event`)
//! - running N independent trials in parallel and summarizing them (`runner`)

pub mod event;
pub mod runner;
pub mod variate;

pub use event::*;
pub use runner::*;
pub use variate::*;
