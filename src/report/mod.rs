//! Reporting utilities: terminal summaries and JSON output.

pub mod format;

pub use format::*;
