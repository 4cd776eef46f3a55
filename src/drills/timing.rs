// ABOUTME: Anticipation timing drill: tap the moment a mover crosses a line on its track
// ABOUTME: Scored by timing error against a per-tier tolerance window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::engine::{mean, CompletionGuard, Tally};
use super::{millis, Drill, DrillConfig, DrillInput, DrillStage, DrillView};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tex_vision_core::models::{DrillId, DrillMetrics, DrillOutcome, Tier};
use tracing::trace;

/// Tier constants for anticipation timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnticipationParams {
    /// Rounds played
    pub rounds: u32,
    /// Time for the mover to cover the whole track (ms)
    pub travel_ms: u64,
    /// Largest timing error that still counts as a hit (ms)
    pub tolerance_ms: u64,
    /// Pause between runs (ms)
    pub gap_ms: u64,
}

/// Anticipation timing constants by tier
#[must_use]
pub const fn anticipation_params(tier: Tier) -> AnticipationParams {
    match tier {
        Tier::Beginner => AnticipationParams {
            rounds: 8,
            travel_ms: 2000,
            tolerance_ms: 100,
            gap_ms: 1000,
        },
        Tier::Advanced => AnticipationParams {
            rounds: 10,
            travel_ms: 1600,
            tolerance_ms: 70,
            gap_ms: 1000,
        },
        Tier::Elite => AnticipationParams {
            rounds: 12,
            travel_ms: 1200,
            tolerance_ms: 45,
            gap_ms: 1000,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Waiting,
    Moving,
    Complete,
}

/// Tap as the mover crosses the line
pub struct AnticipationTiming {
    params: AnticipationParams,
    travel: Duration,
    tolerance: Duration,
    gap: Duration,
    rng: ChaCha8Rng,
    stage: Stage,
    stage_started: Duration,
    clock: Duration,
    line: f64,
    errors_ms: Vec<f64>,
    early: u32,
    late: u32,
    tally: Tally,
    guard: CompletionGuard,
}

impl AnticipationTiming {
    /// Build the drill; difficulty scales the travel time
    #[must_use]
    pub fn new(config: DrillConfig, rng: ChaCha8Rng) -> Self {
        let params = anticipation_params(config.tier);
        Self {
            params,
            travel: config.scaled_ms(params.travel_ms),
            tolerance: Duration::from_millis(params.tolerance_ms),
            gap: Duration::from_millis(params.gap_ms),
            rng,
            stage: Stage::Waiting,
            stage_started: Duration::ZERO,
            clock: Duration::ZERO,
            line: 0.5,
            errors_ms: Vec::new(),
            early: 0,
            late: 0,
            tally: Tally::default(),
            guard: CompletionGuard::new(),
        }
    }

    /// When the mover reaches the line (ms since drill start)
    fn crossing(&self) -> Duration {
        self.stage_started + self.travel.mul_f64(self.line)
    }

    fn start_run(&mut self, at: Duration) {
        self.line = self.rng.gen_range(0.5..0.85);
        self.stage = Stage::Moving;
        self.stage_started = at;
    }

    fn end_run(&mut self, at: Duration) -> Option<DrillOutcome> {
        if self.tally.attempts() >= self.params.rounds {
            return self.complete();
        }
        self.stage = Stage::Waiting;
        self.stage_started = at;
        None
    }

    fn complete(&mut self) -> Option<DrillOutcome> {
        self.stage = Stage::Complete;
        let mut extra = DrillMetrics::new();
        if let Some(avg) = mean(&self.errors_ms) {
            extra.insert("meanErrorMs".to_owned(), json!(avg.round()));
        }
        extra.insert("earlyTaps".to_owned(), json!(self.early));
        extra.insert("lateTaps".to_owned(), json!(self.late));
        let tally = &self.tally;
        self.guard.complete(|| {
            let mut outcome = tally.outcome(false, extra);
            // Timing error is not a reaction time
            outcome.reaction_time_ms = None;
            outcome
        })
    }
}

impl Drill for AnticipationTiming {
    fn id(&self) -> DrillId {
        DrillId::AnticipationTiming
    }

    fn advance(&mut self, now: Duration) -> Option<DrillOutcome> {
        self.clock = self.clock.max(now);
        loop {
            match self.stage {
                Stage::Waiting if now >= self.stage_started + self.gap => {
                    let at = self.stage_started + self.gap;
                    self.start_run(at);
                }
                Stage::Moving if now >= self.stage_started + self.travel => {
                    let end = self.stage_started + self.travel;
                    self.tally.miss();
                    if let Some(outcome) = self.end_run(end) {
                        return Some(outcome);
                    }
                }
                _ => return None,
            }
        }
    }

    fn input(&mut self, now: Duration, input: DrillInput) -> Option<DrillOutcome> {
        if self.stage == Stage::Complete {
            return None;
        }
        if let Some(outcome) = self.advance(now) {
            return Some(outcome);
        }
        self.tally.interaction();
        if input != DrillInput::Tap || self.stage != Stage::Moving {
            return None;
        }
        let crossing = self.crossing();
        let (error, is_early) = if now < crossing {
            (crossing - now, true)
        } else {
            (now - crossing, false)
        };
        let error_ms = error.as_micros() as f64 / 1000.0;
        self.errors_ms.push(error_ms);
        trace!(error_ms, is_early, "Anticipation tap judged");
        if error <= self.tolerance {
            self.tally.correct(None);
        } else {
            if is_early {
                self.early += 1;
            } else {
                self.late += 1;
            }
            self.tally.incorrect();
        }
        self.end_run(now)
    }

    fn expire(&mut self) -> Option<DrillOutcome> {
        if self.stage == Stage::Complete {
            return None;
        }
        self.complete()
    }

    fn view(&self) -> DrillView {
        let (stage, stimulus) = match self.stage {
            Stage::Waiting => (DrillStage::Waiting, None),
            Stage::Moving => {
                let progress = if self.travel.is_zero() {
                    1.0
                } else {
                    (self.clock.saturating_sub(self.stage_started).as_secs_f64()
                        / self.travel.as_secs_f64())
                    .min(1.0)
                };
                (
                    DrillStage::Tracking,
                    Some(json!({ "position": progress, "line": self.line })),
                )
            }
            Stage::Complete => (DrillStage::Complete, None),
        };
        DrillView {
            drill: DrillId::AnticipationTiming,
            stage,
            round: self.tally.attempts(),
            total_rounds: self.params.rounds,
            stage_started_ms: millis(self.stage_started),
            stimulus,
        }
    }

    fn is_complete(&self) -> bool {
        self.guard.has_fired()
    }
}
