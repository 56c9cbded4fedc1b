//! Terminal plotting of sample sets.

pub mod ascii;

pub use ascii::*;
