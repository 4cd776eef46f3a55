// ABOUTME: Session fatigue: grows with each completed drill and decays during breaks
// ABOUTME: Owned by one session, never persisted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::config::SessionConfig;
use std::time::Duration;

/// Fatigue score between 0 and the configured ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct FatigueModel {
    score: f64,
    base_increase: f64,
    low_accuracy_penalty: f64,
    low_accuracy_threshold: f64,
    escalation_interval: u32,
    escalation_step: f64,
    max: f64,
    decay_per_sec: f64,
}

impl Default for FatigueModel {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl FatigueModel {
    /// Fresh model with the session's constants
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            score: 0.0,
            base_increase: config.fatigue_base_increase,
            low_accuracy_penalty: config.fatigue_low_accuracy_penalty,
            low_accuracy_threshold: config.fatigue_low_accuracy_threshold,
            escalation_interval: config.fatigue_escalation_interval.max(1),
            escalation_step: config.fatigue_escalation_step,
            max: config.fatigue_max,
            decay_per_sec: config.break_decay_per_sec,
        }
    }

    /// Current score
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Increase after a completed drill
    ///
    /// `completed_before` counts the drills finished earlier in this session.
    /// A missing accuracy does not trigger the low-accuracy penalty.
    pub fn record_completion(&mut self, accuracy: Option<f64>, completed_before: u32) -> f64 {
        let penalty = match accuracy {
            Some(a) if a < self.low_accuracy_threshold => self.low_accuracy_penalty,
            _ => 0.0,
        };
        let escalation =
            f64::from(completed_before / self.escalation_interval) * self.escalation_step;
        let increase = self.base_increase + penalty + escalation;
        self.score = (self.score + increase).min(self.max);
        increase
    }

    /// Linear decay while resting, floored at zero
    pub fn decay(&mut self, elapsed: Duration) {
        self.score = (self.score - elapsed.as_secs_f64() * self.decay_per_sec).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_stops_exactly_at_ceiling() {
        let mut fatigue = FatigueModel::default();
        let mut completed = 0;
        while fatigue.score() < 100.0 {
            fatigue.record_completion(Some(40.0), completed);
            completed += 1;
            assert!(completed < 50, "fatigue never reached the ceiling");
        }
        assert_eq!(fatigue.score().to_bits(), 100.0_f64.to_bits());

        let increase = fatigue.record_completion(Some(40.0), completed);
        assert!(increase > 0.0);
        assert_eq!(fatigue.score().to_bits(), 100.0_f64.to_bits());
    }

    #[test]
    fn test_decay_from_ceiling_floors_at_zero() {
        let mut fatigue = FatigueModel::default();
        for completed in 0..20 {
            fatigue.record_completion(None, completed);
        }
        assert_eq!(fatigue.score().to_bits(), 100.0_f64.to_bits());

        fatigue.decay(Duration::from_secs(10));
        assert!((fatigue.score() - 95.0).abs() < f64::EPSILON);
        fatigue.decay(Duration::from_secs(600));
        assert_eq!(fatigue.score().to_bits(), 0.0_f64.to_bits());
    }
}
