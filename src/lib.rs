//! `commute-risk` library crate.
//!
//! The binary (`commute`) is a thin wrapper around this library so that:
//!
//! - the simulation and inference core is testable without spawning processes
//! - the core never prints or logs; front-ends decide how to present results
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod bayes;
pub mod cli;
pub mod domain;
pub mod error;
pub mod plot;
pub mod report;
pub mod sim;
pub mod stats;
