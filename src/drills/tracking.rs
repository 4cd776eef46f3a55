// ABOUTME: Tracking drills: follow several targets among distractors, or predict a ball's exit zone
// ABOUTME: Object motion is a pure function of time so any tick rate renders the same path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::engine::{percent, CompletionGuard, Tally};
use super::{millis, Drill, DrillConfig, DrillInput, DrillStage, DrillView};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::time::Duration;
use tex_vision_core::models::{DrillId, DrillMetrics, DrillOutcome, Tier};

const ROUND_GAP_MS: u64 = 1000;

/// Tier constants for multiple-object tracking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackingParams {
    /// Rounds played
    pub rounds: u32,
    /// Objects on screen
    pub objects: u32,
    /// Objects to follow
    pub targets: u32,
    /// Target highlight before motion starts (ms)
    pub highlight_ms: u64,
    /// Motion phase (ms)
    pub tracking_ms: u64,
    /// Time allowed to pick the targets (ms)
    pub response_ms: u64,
    /// Object speed (arena widths per second)
    pub speed: f64,
}

/// Tracking constants by tier
#[must_use]
pub const fn tracking_params(tier: Tier) -> TrackingParams {
    match tier {
        Tier::Beginner => TrackingParams {
            rounds: 5,
            objects: 6,
            targets: 2,
            highlight_ms: 2000,
            tracking_ms: 6000,
            response_ms: 10_000,
            speed: 0.15,
        },
        Tier::Advanced => TrackingParams {
            rounds: 6,
            objects: 8,
            targets: 3,
            highlight_ms: 2000,
            tracking_ms: 8000,
            response_ms: 10_000,
            speed: 0.22,
        },
        Tier::Elite => TrackingParams {
            rounds: 8,
            objects: 10,
            targets: 4,
            highlight_ms: 1500,
            tracking_ms: 10_000,
            response_ms: 10_000,
            speed: 0.3,
        },
    }
}

/// Fold a coordinate into 0..=1 as if it bounced off both walls
fn bounce(p: f64) -> f64 {
    let m = p.rem_euclid(2.0);
    if m > 1.0 {
        2.0 - m
    } else {
        m
    }
}

#[derive(Debug, Clone, Copy)]
struct MovingObject {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

impl MovingObject {
    fn random(rng: &mut ChaCha8Rng, speed: f64) -> Self {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        Self {
            x: rng.gen_range(0.05..0.95),
            y: rng.gen_range(0.05..0.95),
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
        }
    }

    fn position(&self, secs: f64) -> (f64, f64) {
        (bounce(self.x + self.vx * secs), bounce(self.y + self.vy * secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Waiting,
    Highlight,
    Tracking,
    Responding,
    Complete,
}

/// Follow several highlighted targets among identical distractors
pub struct MultipleObjectTracking {
    params: TrackingParams,
    highlight: Duration,
    tracking: Duration,
    response: Duration,
    rng: ChaCha8Rng,
    stage: Stage,
    stage_started: Duration,
    clock: Duration,
    objects: Vec<MovingObject>,
    targets: BTreeSet<u32>,
    selected: BTreeSet<u32>,
    targets_found: u32,
    targets_shown: u32,
    tally: Tally,
    guard: CompletionGuard,
}

impl MultipleObjectTracking {
    /// Build the drill; difficulty scales object speed only
    #[must_use]
    pub fn new(config: DrillConfig, rng: ChaCha8Rng) -> Self {
        let mut params = tracking_params(config.tier);
        params.speed /= config.speed_factor();
        Self {
            params,
            highlight: Duration::from_millis(params.highlight_ms),
            tracking: Duration::from_millis(params.tracking_ms),
            response: Duration::from_millis(params.response_ms),
            rng,
            stage: Stage::Waiting,
            stage_started: Duration::ZERO,
            clock: Duration::ZERO,
            objects: Vec::new(),
            targets: BTreeSet::new(),
            selected: BTreeSet::new(),
            targets_found: 0,
            targets_shown: 0,
            tally: Tally::default(),
            guard: CompletionGuard::new(),
        }
    }

    fn start_round(&mut self, at: Duration) {
        let speed = self.params.speed;
        self.objects = (0..self.params.objects)
            .map(|_| MovingObject::random(&mut self.rng, speed))
            .collect();
        self.targets.clear();
        while self.targets.len() < self.params.targets as usize {
            self.targets.insert(self.rng.gen_range(0..self.params.objects));
        }
        self.selected.clear();
        self.stage = Stage::Highlight;
        self.stage_started = at;
    }

    fn judge_round(&mut self, at: Duration) -> Option<DrillOutcome> {
        let found = self.selected.intersection(&self.targets).count() as u32;
        self.targets_found += found;
        self.targets_shown += self.params.targets;
        if found == self.params.targets {
            self.tally.correct(Some(at.saturating_sub(self.stage_started)));
        } else {
            self.tally.incorrect();
        }
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
        extra.insert("targetsFound".to_owned(), json!(self.targets_found));
        extra.insert("totalTargets".to_owned(), json!(self.targets_shown));
        extra.insert("perfectRounds".to_owned(), json!(self.tally.correct_count()));
        let accuracy = percent(self.targets_found, self.targets_shown);
        let tally = &self.tally;
        self.guard.complete(|| {
            let mut outcome = tally.outcome(false, extra);
            outcome.accuracy_percent = Some(accuracy);
            outcome
        })
    }

    fn motion_secs(&self) -> f64 {
        match self.stage {
            Stage::Tracking => self.clock.saturating_sub(self.stage_started).as_secs_f64(),
            Stage::Responding | Stage::Complete => self.tracking.as_secs_f64(),
            Stage::Waiting | Stage::Highlight => 0.0,
        }
    }
}

impl Drill for MultipleObjectTracking {
    fn id(&self) -> DrillId {
        DrillId::MultipleObjectTracking
    }

    fn advance(&mut self, now: Duration) -> Option<DrillOutcome> {
        self.clock = self.clock.max(now);
        loop {
            match self.stage {
                Stage::Waiting => {
                    let due = if self.tally.attempts() == 0 {
                        Duration::ZERO
                    } else {
                        self.stage_started + Duration::from_millis(ROUND_GAP_MS)
                    };
                    if now < due {
                        return None;
                    }
                    self.start_round(due);
                }
                Stage::Highlight if now >= self.stage_started + self.highlight => {
                    self.stage_started += self.highlight;
                    self.stage = Stage::Tracking;
                }
                Stage::Tracking if now >= self.stage_started + self.tracking => {
                    self.stage_started += self.tracking;
                    self.stage = Stage::Responding;
                }
                Stage::Responding if now >= self.stage_started + self.response => {
                    let deadline = self.stage_started + self.response;
                    if let Some(outcome) = self.judge_round(deadline) {
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
        if self.stage != Stage::Responding {
            return None;
        }
        match input {
            DrillInput::Select { object } if object < self.params.objects => {
                if !self.selected.remove(&object) {
                    self.selected.insert(object);
                }
                if self.selected.len() == self.params.targets as usize {
                    return self.judge_round(now);
                }
                None
            }
            DrillInput::Confirm => self.judge_round(now),
            _ => None,
        }
    }

    fn expire(&mut self) -> Option<DrillOutcome> {
        if self.stage == Stage::Complete {
            return None;
        }
        self.complete()
    }

    fn view(&self) -> DrillView {
        let secs = self.motion_secs();
        let show_targets = self.stage == Stage::Highlight;
        let objects: Vec<_> = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let (x, y) = o.position(secs);
                let index = i as u32;
                json!({
                    "x": x,
                    "y": y,
                    "highlighted": show_targets && self.targets.contains(&index),
                    "selected": self.selected.contains(&index),
                })
            })
            .collect();
        let stage = match self.stage {
            Stage::Waiting => DrillStage::Waiting,
            Stage::Highlight => DrillStage::Highlight,
            Stage::Tracking => DrillStage::Tracking,
            Stage::Responding => DrillStage::Responding,
            Stage::Complete => DrillStage::Complete,
        };
        DrillView {
            drill: DrillId::MultipleObjectTracking,
            stage,
            round: self.tally.attempts(),
            total_rounds: self.params.rounds,
            stage_started_ms: millis(self.stage_started),
            stimulus: (!self.objects.is_empty()).then(|| {
                json!({ "objects": objects, "targetCount": self.params.targets })
            }),
        }
    }

    fn is_complete(&self) -> bool {
        self.guard.has_fired()
    }
}

/// Tier constants for ball tracking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallTrackingParams {
    /// Rounds played
    pub rounds: u32,
    /// Exit zones along the far edge
    pub zones: u32,
    /// Full crossing time (ms)
    pub travel_ms: u64,
    /// Fraction of the crossing shown before the ball is hidden
    pub visible_fraction: f64,
    /// Time allowed to call the zone (ms)
    pub response_ms: u64,
}

/// Ball tracking constants by tier
#[must_use]
pub const fn ball_tracking_params(tier: Tier) -> BallTrackingParams {
    match tier {
        Tier::Beginner => BallTrackingParams {
            rounds: 8,
            zones: 3,
            travel_ms: 2500,
            visible_fraction: 0.6,
            response_ms: 3000,
        },
        Tier::Advanced => BallTrackingParams {
            rounds: 10,
            zones: 5,
            travel_ms: 2000,
            visible_fraction: 0.5,
            response_ms: 3000,
        },
        Tier::Elite => BallTrackingParams {
            rounds: 12,
            zones: 7,
            travel_ms: 1500,
            visible_fraction: 0.4,
            response_ms: 2500,
        },
    }
}

/// Watch a ball cross the field, then call the zone it will exit through
pub struct BallTracking {
    params: BallTrackingParams,
    visible: Duration,
    response: Duration,
    rng: ChaCha8Rng,
    stage: Stage,
    stage_started: Duration,
    clock: Duration,
    start_y: f64,
    slope: f64,
    exit_zone: u32,
    tally: Tally,
    guard: CompletionGuard,
}

impl BallTracking {
    /// Build the drill; difficulty scales the crossing time only
    #[must_use]
    pub fn new(config: DrillConfig, rng: ChaCha8Rng) -> Self {
        let params = ball_tracking_params(config.tier);
        let travel = config.scaled_ms(params.travel_ms);
        Self {
            params,
            visible: travel.mul_f64(params.visible_fraction),
            response: Duration::from_millis(params.response_ms),
            rng,
            stage: Stage::Waiting,
            stage_started: Duration::ZERO,
            clock: Duration::ZERO,
            start_y: 0.5,
            slope: 0.0,
            exit_zone: 0,
            tally: Tally::default(),
            guard: CompletionGuard::new(),
        }
    }

    fn start_round(&mut self, at: Duration) {
        self.start_y = self.rng.gen_range(0.1..0.9);
        self.slope = self.rng.gen_range(-1.2..1.2);
        let exit_y = bounce(self.start_y + self.slope);
        self.exit_zone = ((exit_y * f64::from(self.params.zones)) as u32).min(self.params.zones - 1);
        self.stage = Stage::Tracking;
        self.stage_started = at;
    }

    fn judge(&mut self, at: Duration, zone: Option<u32>) -> Option<DrillOutcome> {
        if zone == Some(self.exit_zone) {
            self.tally.correct(Some(at.saturating_sub(self.stage_started)));
        } else if zone.is_none() {
            self.tally.miss();
        } else {
            self.tally.incorrect();
        }
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
        extra.insert("zones".to_owned(), json!(self.params.zones));
        let tally = &self.tally;
        self.guard.complete(|| tally.outcome(false, extra))
    }
}

impl Drill for BallTracking {
    fn id(&self) -> DrillId {
        DrillId::BallTracking
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
                Stage::Tracking if now >= self.stage_started + self.visible => {
                    self.stage_started += self.visible;
                    self.stage = Stage::Responding;
                }
                Stage::Responding if now >= self.stage_started + self.response => {
                    let deadline = self.stage_started + self.response;
                    if let Some(outcome) = self.judge(deadline, None) {
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
        match (self.stage, input) {
            (Stage::Responding, DrillInput::Choose { option }) => self.judge(now, Some(option)),
            _ => None,
        }
    }

    fn expire(&mut self) -> Option<DrillOutcome> {
        if self.stage == Stage::Complete {
            return None;
        }
        self.complete()
    }

    fn view(&self) -> DrillView {
        let stage = match self.stage {
            Stage::Waiting | Stage::Highlight => DrillStage::Waiting,
            Stage::Tracking => DrillStage::Tracking,
            Stage::Responding => DrillStage::Responding,
            Stage::Complete => DrillStage::Complete,
        };
        let stimulus = (stage == DrillStage::Tracking).then(|| {
            let progress = if self.visible.is_zero() {
                0.0
            } else {
                self.clock.saturating_sub(self.stage_started).as_secs_f64()
                    / self.visible.as_secs_f64()
                    * self.params.visible_fraction
            };
            let progress = progress.min(self.params.visible_fraction);
            json!({
                "x": progress,
                "y": bounce(self.start_y + self.slope * progress),
                "zones": self.params.zones,
            })
        });
        DrillView {
            drill: DrillId::BallTracking,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounce_stays_in_arena() {
        for p in [-2.3, -0.4, 0.0, 0.5, 1.0, 1.7, 3.2] {
            let b = bounce(p);
            assert!((0.0..=1.0).contains(&b), "{p} -> {b}");
        }
        assert!((bounce(1.25) - 0.75).abs() < 1e-9);
    }
}
