// ABOUTME: Sequence recall drill: watch pads light up in order, then tap them back
// ABOUTME: A correct recall grows the sequence by one; a mistake replays a fresh one at the same length
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

const ROUND_GAP_MS: u64 = 1000;

/// Tier constants for sequence recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceParams {
    /// Rounds played
    pub rounds: u32,
    /// Pads on the board
    pub pads: u32,
    /// Length of the first sequence
    pub start_length: u32,
    /// How long each pad stays lit (ms)
    pub flash_ms: u64,
    /// Dark time between flashes (ms)
    pub gap_ms: u64,
    /// Longest pause allowed between taps (ms)
    pub input_timeout_ms: u64,
}

/// Sequence recall constants by tier
#[must_use]
pub const fn sequence_params(tier: Tier) -> SequenceParams {
    match tier {
        Tier::Beginner => SequenceParams {
            rounds: 6,
            pads: 4,
            start_length: 3,
            flash_ms: 600,
            gap_ms: 250,
            input_timeout_ms: 5000,
        },
        Tier::Advanced => SequenceParams {
            rounds: 8,
            pads: 6,
            start_length: 4,
            flash_ms: 450,
            gap_ms: 200,
            input_timeout_ms: 5000,
        },
        Tier::Elite => SequenceParams {
            rounds: 10,
            pads: 9,
            start_length: 5,
            flash_ms: 350,
            gap_ms: 150,
            input_timeout_ms: 5000,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Waiting,
    Showing,
    Responding,
    Complete,
}

/// Reproduce a growing sequence of lit pads
pub struct SequenceRecall {
    params: SequenceParams,
    flash: Duration,
    gap: Duration,
    input_timeout: Duration,
    rng: ChaCha8Rng,
    stage: Stage,
    stage_started: Duration,
    clock: Duration,
    length: u32,
    sequence: Vec<u32>,
    entered: Vec<u32>,
    last_tap: Duration,
    tap_intervals_ms: Vec<f64>,
    longest: u32,
    tally: Tally,
    guard: CompletionGuard,
}

impl SequenceRecall {
    /// Build the drill; difficulty scales the flash and gap lengths
    #[must_use]
    pub fn new(config: DrillConfig, rng: ChaCha8Rng) -> Self {
        let params = sequence_params(config.tier);
        Self {
            params,
            flash: config.scaled_ms(params.flash_ms),
            gap: config.scaled_ms(params.gap_ms),
            input_timeout: Duration::from_millis(params.input_timeout_ms),
            rng,
            stage: Stage::Waiting,
            stage_started: Duration::ZERO,
            clock: Duration::ZERO,
            length: params.start_length,
            sequence: Vec::new(),
            entered: Vec::new(),
            last_tap: Duration::ZERO,
            tap_intervals_ms: Vec::new(),
            longest: 0,
            tally: Tally::default(),
            guard: CompletionGuard::new(),
        }
    }

    fn playback(&self) -> Duration {
        (self.flash + self.gap) * self.length
    }

    fn start_round(&mut self, at: Duration) {
        let pads = self.params.pads;
        self.sequence = (0..self.length).map(|_| self.rng.gen_range(0..pads)).collect();
        self.entered.clear();
        self.stage = Stage::Showing;
        self.stage_started = at;
    }

    fn finish_round(&mut self, at: Duration, recalled: bool) -> Option<DrillOutcome> {
        if recalled {
            self.longest = self.longest.max(self.length);
            let rt = mean(&self.tap_intervals_ms)
                .map(|ms| Duration::from_micros((ms * 1000.0).round() as u64));
            self.tally.correct(rt);
            self.length += 1;
        } else {
            self.tally.incorrect();
        }
        self.tap_intervals_ms.clear();
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
        extra.insert("longestSequence".to_owned(), json!(self.longest));
        let tally = &self.tally;
        self.guard.complete(|| tally.outcome(false, extra))
    }

    fn lit_pad(&self) -> Option<u32> {
        if self.stage != Stage::Showing {
            return None;
        }
        let step = self.flash + self.gap;
        if step.is_zero() {
            return None;
        }
        let into = self.clock.saturating_sub(self.stage_started);
        let index = (into.as_nanos() / step.as_nanos()) as usize;
        let within = into.saturating_sub(step * index as u32);
        if within < self.flash {
            self.sequence.get(index).copied()
        } else {
            None
        }
    }
}

impl Drill for SequenceRecall {
    fn id(&self) -> DrillId {
        DrillId::SequenceRecall
    }

    fn advance(&mut self, now: Duration) -> Option<DrillOutcome> {
        self.clock = self.clock.max(now);
        loop {
            match self.stage {
                Stage::Waiting => {
                    let due = if self.tally.attempts() == 0 {
                        Duration::from_millis(ROUND_GAP_MS)
                    } else {
                        self.stage_started + Duration::from_millis(ROUND_GAP_MS)
                    };
                    if now < due {
                        return None;
                    }
                    self.start_round(due);
                }
                Stage::Showing if now >= self.stage_started + self.playback() => {
                    self.stage_started += self.playback();
                    self.last_tap = self.stage_started;
                    self.stage = Stage::Responding;
                }
                Stage::Responding if now >= self.last_tap + self.input_timeout => {
                    let deadline = self.last_tap + self.input_timeout;
                    if let Some(outcome) = self.finish_round(deadline, false) {
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
        let DrillInput::Choose { option: pad } = input else {
            return None;
        };
        if self.stage != Stage::Responding {
            return None;
        }
        self.tap_intervals_ms
            .push(now.saturating_sub(self.last_tap).as_micros() as f64 / 1000.0);
        self.last_tap = now;
        let position = self.entered.len();
        self.entered.push(pad);
        if self.sequence.get(position) != Some(&pad) {
            return self.finish_round(now, false);
        }
        if self.entered.len() == self.sequence.len() {
            return self.finish_round(now, true);
        }
        None
    }

    fn expire(&mut self) -> Option<DrillOutcome> {
        if self.stage == Stage::Complete {
            return None;
        }
        self.complete()
    }

    fn view(&self) -> DrillView {
        let stage = match self.stage {
            Stage::Waiting => DrillStage::Waiting,
            Stage::Showing => DrillStage::Showing,
            Stage::Responding => DrillStage::Responding,
            Stage::Complete => DrillStage::Complete,
        };
        DrillView {
            drill: DrillId::SequenceRecall,
            stage,
            round: self.tally.attempts(),
            total_rounds: self.params.rounds,
            stage_started_ms: millis(self.stage_started),
            stimulus: Some(json!({
                "pads": self.params.pads,
                "length": self.length,
                "lit": self.lit_pad(),
                "entered": self.entered.len(),
            })),
        }
    }

    fn is_complete(&self) -> bool {
        self.guard.has_fired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn drill() -> SequenceRecall {
        SequenceRecall::new(
            DrillConfig::new(Tier::Beginner, 7),
            ChaCha8Rng::seed_from_u64(7),
        )
    }

    #[test]
    fn test_correct_recall_grows_sequence() {
        let mut d = drill();
        let playback_end = 1000 + 3 * (600 + 250);
        assert!(d.advance(Duration::from_millis(playback_end)).is_none());
        assert_eq!(d.stage, Stage::Responding);

        let pads = d.sequence.clone();
        let mut t = playback_end;
        for pad in pads {
            t += 400;
            assert!(d.input(Duration::from_millis(t), DrillInput::Choose { option: pad }).is_none());
        }
        assert_eq!(d.length, 4);
        assert_eq!(d.tally.correct_count(), 1);
        assert_eq!(d.tally.mean_reaction_ms(), Some(400.0));
    }

    #[test]
    fn test_wrong_pad_keeps_length() {
        let mut d = drill();
        let playback_end = 1000 + 3 * (600 + 250);
        d.advance(Duration::from_millis(playback_end));
        let wrong = (d.sequence[0] + 1) % 4;
        d.input(Duration::from_millis(playback_end + 300), DrillInput::Choose { option: wrong });
        assert_eq!(d.length, 3);
        assert_eq!(d.tally.attempts(), 1);
        assert_eq!(d.stage, Stage::Waiting);
    }
}
