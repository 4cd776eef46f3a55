// ABOUTME: Shared scoring for drill engines and the guard that emits an outcome only once
// ABOUTME: Normalises accuracy, mean reaction time, false positives and best streak
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use serde_json::json;
use std::time::Duration;
use tex_vision_core::models::{DrillMetrics, DrillOutcome};
use tracing::debug;

/// Lets exactly one completion path through
///
/// Every path that can finish a drill (last round judged, timer expiry)
/// goes through [`CompletionGuard::complete`]; only the first one yields
/// an outcome.
#[derive(Debug, Default)]
pub struct CompletionGuard {
    fired: bool,
}

impl CompletionGuard {
    /// New, unfired guard
    #[must_use]
    pub const fn new() -> Self {
        Self { fired: false }
    }

    /// Build the outcome if the guard has not fired yet
    pub fn complete(&mut self, build: impl FnOnce() -> DrillOutcome) -> Option<DrillOutcome> {
        if self.fired {
            debug!("Drill completion already emitted, ignoring");
            return None;
        }
        self.fired = true;
        Some(build())
    }

    /// Whether an outcome was emitted
    #[must_use]
    pub const fn has_fired(&self) -> bool {
        self.fired
    }
}

/// Running score of a drill
#[derive(Debug, Default, Clone)]
pub struct Tally {
    correct: u32,
    correct_rejections: u32,
    attempts: u32,
    misses: u32,
    false_positives: u32,
    interactions: u32,
    reaction_times_ms: Vec<f64>,
    current_streak: u32,
    best_streak: u32,
}

impl Tally {
    /// Record a correct response; `reaction` is `None` when the drill does not time responses
    pub fn correct(&mut self, reaction: Option<Duration>) {
        self.correct += 1;
        self.extend_streak();
        if let Some(rt) = reaction {
            self.reaction_times_ms.push(rt.as_micros() as f64 / 1000.0);
        }
    }

    /// Record a non-target correctly left alone
    ///
    /// Counts as an attempt and keeps the streak going, but is not a hit.
    pub fn correct_rejection(&mut self) {
        self.correct_rejections += 1;
        self.extend_streak();
    }

    fn extend_streak(&mut self) {
        self.attempts += 1;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
    }

    /// Record a wrong answer
    pub fn incorrect(&mut self) {
        self.attempts += 1;
        self.current_streak = 0;
    }

    /// Record a response to a non-target stimulus
    pub fn false_positive(&mut self) {
        self.false_positives += 1;
        self.incorrect();
    }

    /// Record a round that timed out without a required response
    pub fn miss(&mut self) {
        self.misses += 1;
        self.incorrect();
    }

    /// Count a user interaction
    pub fn interaction(&mut self) {
        self.interactions += 1;
    }

    /// Rounds judged so far
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Correct responses so far
    #[must_use]
    pub const fn correct_count(&self) -> u32 {
        self.correct
    }

    /// `round(correct responses / attempts * 100)`, 0 with no attempts
    #[must_use]
    pub fn accuracy_percent(&self) -> f64 {
        percent(self.correct, self.attempts)
    }

    /// Mean of the recorded reaction times
    #[must_use]
    pub fn mean_reaction_ms(&self) -> Option<f64> {
        mean(&self.reaction_times_ms)
    }

    /// Normalised outcome
    ///
    /// `with_false_positives` controls whether the drill reports a
    /// `false_positives` count and `correctRejections` (only drills with
    /// non-target stimuli do).
    #[must_use]
    pub fn outcome(&self, with_false_positives: bool, extra: DrillMetrics) -> DrillOutcome {
        let mut metrics = DrillMetrics::new();
        metrics.insert("correctHits".to_owned(), json!(self.correct));
        metrics.insert("totalAttempts".to_owned(), json!(self.attempts));
        if with_false_positives {
            metrics.insert(
                "correctRejections".to_owned(),
                json!(self.correct_rejections),
            );
        }
        metrics.insert("misses".to_owned(), json!(self.misses));
        metrics.insert("streak".to_owned(), json!(self.best_streak));
        metrics.insert("interactions".to_owned(), json!(self.interactions));
        metrics.extend(extra);

        DrillOutcome {
            accuracy_percent: Some(self.accuracy_percent()),
            reaction_time_ms: self.mean_reaction_ms(),
            false_positives: with_false_positives.then_some(self.false_positives),
            drill_metrics: metrics,
        }
    }
}

/// `round(part / whole * 100)`, 0 when `whole` is 0
#[must_use]
pub fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (f64::from(part) / f64::from(whole) * 100.0).round()
}

/// Arithmetic mean, `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_fires_once() {
        let mut guard = CompletionGuard::new();
        assert!(guard.complete(DrillOutcome::default).is_some());
        assert!(guard.complete(DrillOutcome::default).is_none());
        assert!(guard.has_fired());
    }

    #[test]
    fn test_streak_tracks_best_run() {
        let mut tally = Tally::default();
        tally.correct(Some(Duration::from_millis(300)));
        tally.correct(Some(Duration::from_millis(200)));
        tally.miss();
        tally.correct(Some(Duration::from_millis(500)));
        let outcome = tally.outcome(false, DrillMetrics::new());
        assert_eq!(outcome.streak(), 2);
        assert_eq!(outcome.accuracy_percent, Some(75.0));
        assert!((outcome.reaction_time_ms.unwrap() - 1000.0 / 3.0).abs() < 1e-9);
        assert_eq!(outcome.false_positives, None);
        assert!(!outcome.drill_metrics.contains_key("correctRejections"));
    }

    #[test]
    fn test_correct_rejection_is_an_attempt_but_not_a_hit() {
        let mut tally = Tally::default();
        tally.correct(Some(Duration::from_millis(300)));
        tally.correct_rejection();
        tally.correct_rejection();
        tally.false_positive();
        let outcome = tally.outcome(true, DrillMetrics::new());
        assert_eq!(outcome.metric_u32("correctHits"), 1);
        assert_eq!(outcome.metric_u32("correctRejections"), 2);
        assert_eq!(outcome.metric_u32("totalAttempts"), 4);
        assert_eq!(outcome.accuracy_percent, Some(25.0));
        assert_eq!(outcome.streak(), 3);
        assert_eq!(outcome.false_positives, Some(1));
        assert_eq!(outcome.reaction_time_ms, Some(300.0));
    }
}
