//! Grid-based Bayesian update over the commute variability.
//!
//! Responsibilities:
//!
//! - build candidate grids for the variability (`grid`)
//! - score each candidate against an observed sample (`likelihood`)
//! - normalize into posterior weights and resample a pool of outcomes (`posterior`)

pub mod grid;
pub mod likelihood;
pub mod posterior;

pub use grid::*;
pub use likelihood::*;
pub use posterior::*;
