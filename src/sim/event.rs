//! Discrete events layered on top of a base draw.
//!
//! The runner only knows about [`Perturbation`]: a step from a base value to
//! an adjusted value that may consume randomness from the trial's stream.
//! [`DelayEvent`] is the one event model the commute scenarios use.

use crate::domain::DelayEvent;
use crate::error::AppError;
use crate::sim::variate::VariateGenerator;

/// Adjusts a single trial after its base draw.
///
/// Implementations must not hold state that one trial writes and another
/// reads; trials run in parallel.
pub trait Perturbation: Sync {
    fn perturb(&self, value: f64, generator: &mut VariateGenerator) -> f64;
}

impl Perturbation for DelayEvent {
    fn perturb(&self, value: f64, generator: &mut VariateGenerator) -> f64 {
        if generator.unit() < self.probability {
            value + self.delay
        } else {
            value
        }
    }
}

/// Add `event_delay` to `value` with probability `event_probability`.
pub fn apply_event(
    generator: &mut VariateGenerator,
    value: f64,
    event_probability: f64,
    event_delay: f64,
) -> Result<f64, AppError> {
    let event = DelayEvent::new(event_probability, event_delay)?;
    Ok(event.perturb(value, generator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certain_event_always_adds_delay() {
        let mut generator = VariateGenerator::seeded(1);
        for _ in 0..50 {
            assert_eq!(apply_event(&mut generator, 30.0, 1.0, 5.0).unwrap(), 35.0);
        }
    }

    #[test]
    fn impossible_event_never_fires() {
        let mut generator = VariateGenerator::seeded(1);
        for _ in 0..50 {
            assert_eq!(apply_event(&mut generator, 30.0, 0.0, 5.0).unwrap(), 30.0);
        }
    }

    #[test]
    fn out_of_range_probability_is_invalid() {
        let mut generator = VariateGenerator::seeded(1);
        let err = apply_event(&mut generator, 30.0, 1.5, 5.0).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(apply_event(&mut generator, 30.0, -0.01, 5.0).is_err());
    }

    #[test]
    fn event_rate_tracks_probability() {
        let mut generator = VariateGenerator::seeded(2024);
        let n = 20_000;
        let fired = (0..n)
            .filter(|_| apply_event(&mut generator, 0.0, 0.1, 1.0).unwrap() > 0.0)
            .count();
        let rate = fired as f64 / n as f64;
        assert!((rate - 0.1).abs() < 0.02, "rate={rate}");
    }
}
