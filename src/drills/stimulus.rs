// ABOUTME: Stimulus-response engine shared by twelve drills plus the rule for each drill
// ABOUTME: A rule generates trials and the engine handles timing, judging and scoring
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Stimulus drills
//!
//! A stimulus drill alternates between a waiting gap and a stimulus window.
//! Each window shows one [`Trial`] produced by the drill's [`StimulusRule`]
//! and ends either with a response or with a timeout. Reaction times are
//! measured from stimulus onset.

use super::engine::{CompletionGuard, Tally};
use super::{millis, Drill, DrillConfig, DrillInput, DrillStage, DrillView};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tex_vision_core::models::{DrillId, DrillMetrics, DrillOutcome, Tier};
use tracing::trace;

/// Tier constants for a stimulus drill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StimulusTiming {
    /// Trials presented
    pub rounds: u32,
    /// How long each stimulus stays up (ms)
    pub stimulus_ms: u64,
    /// Pause between stimuli (ms)
    pub gap_ms: u64,
    /// Random extra pause added to each gap (ms, upper bound)
    pub jitter_ms: u64,
}

const fn timing(rounds: u32, stimulus_ms: u64, gap_ms: u64, jitter_ms: u64) -> StimulusTiming {
    StimulusTiming {
        rounds,
        stimulus_ms,
        gap_ms,
        jitter_ms,
    }
}

/// Drills that run on the stimulus engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StimulusKind {
    /// Tap only the target colour
    ColorFlash,
    /// Tap as soon as the stimulus appears
    ReactionTap,
    /// Tap on go, withhold on no-go
    GoNoGo,
    /// Report which edge flashed
    PeripheralFlash,
    /// Report which peripheral position lit up
    PeripheralExpansion,
    /// Say whether a faint target is present
    ContrastSensitivity,
    /// Report the centre arrow among flankers
    FlankerFocus,
    /// Tap when the jumping letter matches the target
    SaccadeJump,
    /// Name the letter at the active depth
    NearFarFocus,
    /// Read the orientation of a moving letter
    DynamicAcuity,
    /// Find the target cell among distractors
    VisualSearch,
    /// Centre and peripheral task at once
    SplitAttention,
}

impl StimulusKind {
    /// Every stimulus drill
    pub const ALL: [Self; 12] = [
        Self::ColorFlash,
        Self::ReactionTap,
        Self::GoNoGo,
        Self::PeripheralFlash,
        Self::PeripheralExpansion,
        Self::ContrastSensitivity,
        Self::FlankerFocus,
        Self::SaccadeJump,
        Self::NearFarFocus,
        Self::DynamicAcuity,
        Self::VisualSearch,
        Self::SplitAttention,
    ];

    /// Drill id this kind runs as
    #[must_use]
    pub const fn drill_id(self) -> DrillId {
        match self {
            Self::ColorFlash => DrillId::ColorFlash,
            Self::ReactionTap => DrillId::ReactionTap,
            Self::GoNoGo => DrillId::GoNoGo,
            Self::PeripheralFlash => DrillId::PeripheralFlash,
            Self::PeripheralExpansion => DrillId::PeripheralExpansion,
            Self::ContrastSensitivity => DrillId::ContrastSensitivity,
            Self::FlankerFocus => DrillId::FlankerFocus,
            Self::SaccadeJump => DrillId::SaccadeJump,
            Self::NearFarFocus => DrillId::NearFarFocus,
            Self::DynamicAcuity => DrillId::DynamicAcuity,
            Self::VisualSearch => DrillId::VisualSearch,
            Self::SplitAttention => DrillId::SplitAttention,
        }
    }

    /// Tier constants for this drill
    #[must_use]
    pub const fn timing(self, tier: Tier) -> StimulusTiming {
        match (self, tier) {
            (Self::ColorFlash, Tier::Beginner) => timing(15, 1200, 800, 400),
            (Self::ColorFlash, Tier::Advanced) => timing(20, 1000, 700, 300),
            (Self::ColorFlash, Tier::Elite) => timing(25, 800, 600, 200),
            (Self::ReactionTap, Tier::Beginner) => timing(10, 1500, 1000, 1500),
            (Self::ReactionTap, Tier::Advanced) => timing(15, 1200, 800, 1200),
            (Self::ReactionTap, Tier::Elite) => timing(20, 1000, 700, 1000),
            (Self::GoNoGo, Tier::Beginner) => timing(20, 1000, 800, 300),
            (Self::GoNoGo, Tier::Advanced) => timing(25, 800, 700, 300),
            (Self::GoNoGo, Tier::Elite) => timing(30, 650, 600, 200),
            (Self::PeripheralFlash, Tier::Beginner) => timing(12, 1500, 800, 300),
            (Self::PeripheralFlash, Tier::Advanced) => timing(16, 1200, 700, 300),
            (Self::PeripheralFlash, Tier::Elite) => timing(20, 900, 600, 200),
            (Self::PeripheralExpansion, Tier::Beginner) => timing(12, 1800, 800, 300),
            (Self::PeripheralExpansion, Tier::Advanced) => timing(16, 1500, 700, 300),
            (Self::PeripheralExpansion, Tier::Elite) => timing(20, 1200, 600, 200),
            (Self::ContrastSensitivity, Tier::Beginner) => timing(12, 2000, 800, 200),
            (Self::ContrastSensitivity, Tier::Advanced) => timing(16, 1700, 700, 200),
            (Self::ContrastSensitivity, Tier::Elite) => timing(20, 1400, 600, 200),
            (Self::FlankerFocus, Tier::Beginner) => timing(15, 1500, 700, 200),
            (Self::FlankerFocus, Tier::Advanced) => timing(20, 1200, 600, 200),
            (Self::FlankerFocus, Tier::Elite) => timing(25, 1000, 500, 200),
            (Self::SaccadeJump, Tier::Beginner) => timing(15, 1200, 600, 200),
            (Self::SaccadeJump, Tier::Advanced) => timing(20, 1000, 500, 200),
            (Self::SaccadeJump, Tier::Elite) => timing(25, 800, 400, 150),
            (Self::NearFarFocus, Tier::Beginner) => timing(10, 2500, 900, 200),
            (Self::NearFarFocus, Tier::Advanced) => timing(14, 2000, 800, 200),
            (Self::NearFarFocus, Tier::Elite) => timing(18, 1600, 700, 200),
            (Self::DynamicAcuity, Tier::Beginner) => timing(10, 2200, 800, 200),
            (Self::DynamicAcuity, Tier::Advanced) => timing(14, 1800, 700, 200),
            (Self::DynamicAcuity, Tier::Elite) => timing(18, 1400, 600, 200),
            (Self::VisualSearch, Tier::Beginner) => timing(10, 4000, 800, 200),
            (Self::VisualSearch, Tier::Advanced) => timing(12, 3500, 700, 200),
            (Self::VisualSearch, Tier::Elite) => timing(15, 3000, 600, 200),
            (Self::SplitAttention, Tier::Beginner) => timing(10, 2500, 900, 300),
            (Self::SplitAttention, Tier::Advanced) => timing(14, 2000, 800, 300),
            (Self::SplitAttention, Tier::Elite) => timing(18, 1600, 700, 300),
        }
    }
}

/// How the athlete answers a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Tap on targets, withhold on everything else
    Tap,
    /// Pick one of `options`
    Choice {
        /// Number of options
        options: u32,
    },
    /// Centre answer plus peripheral answer
    Dual,
}

/// One stimulus presentation
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// Tap mode: tapping is the correct response
    pub target: bool,
    /// Correct option (choice mode) or centre answer (dual mode)
    pub answer: u32,
    /// Peripheral answer (dual mode)
    pub secondary: u32,
    /// What the renderer draws
    pub display: Value,
}

impl Trial {
    fn tap(target: bool, display: Value) -> Self {
        Self {
            target,
            answer: 0,
            secondary: 0,
            display,
        }
    }

    fn choice(answer: u32, display: Value) -> Self {
        Self {
            target: true,
            answer,
            secondary: 0,
            display,
        }
    }
}

/// Per-drill trial generator
pub trait StimulusRule: Send + Sync {
    /// Drill this rule implements
    fn id(&self) -> DrillId;

    /// Expected response
    fn mode(&self) -> ResponseMode;

    /// Whether some stimuli are non-targets that must not be tapped
    fn has_distractors(&self) -> bool {
        false
    }

    /// Generate the trial for `round` (0-based)
    fn next_trial(&mut self, rng: &mut ChaCha8Rng, round: u32) -> Trial;
}

const COLORS: [&str; 5] = ["red", "blue", "green", "yellow", "purple"];
const LETTERS: [&str; 8] = ["E", "F", "H", "L", "P", "T", "X", "Z"];
const SIDES: [&str; 2] = ["left", "right"];

fn pick_other(rng: &mut ChaCha8Rng, pool: &[&'static str], not: &'static str) -> &'static str {
    let others: Vec<&'static str> = pool.iter().copied().filter(|c| *c != not).collect();
    others.choose(rng).copied().unwrap_or(not)
}

/// Tap when the flashed colour matches the target colour
pub struct ColorFlash {
    target_color: &'static str,
}

impl ColorFlash {
    /// Choose the target colour for the whole drill
    pub fn new(rng: &mut ChaCha8Rng) -> Self {
        Self {
            target_color: COLORS.choose(rng).copied().unwrap_or("red"),
        }
    }
}

impl StimulusRule for ColorFlash {
    fn id(&self) -> DrillId {
        DrillId::ColorFlash
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Tap
    }

    fn has_distractors(&self) -> bool {
        true
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        let target = rng.gen_bool(0.4);
        let color = if target {
            self.target_color
        } else {
            pick_other(rng, &COLORS, self.target_color)
        };
        Trial::tap(target, json!({ "color": color, "targetColor": self.target_color }))
    }
}

/// Every flash is a target
pub struct ReactionTap;

impl StimulusRule for ReactionTap {
    fn id(&self) -> DrillId {
        DrillId::ReactionTap
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Tap
    }

    fn next_trial(&mut self, _rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        Trial::tap(true, json!({ "light": "on" }))
    }
}

/// Tap green, withhold red
pub struct GoNoGo {
    go_probability: f64,
}

impl GoNoGo {
    /// Higher tiers show more no-go stimuli
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let go_probability = match tier {
            Tier::Beginner => 0.75,
            Tier::Advanced => 0.7,
            Tier::Elite => 0.6,
        };
        Self { go_probability }
    }
}

impl StimulusRule for GoNoGo {
    fn id(&self) -> DrillId {
        DrillId::GoNoGo
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Tap
    }

    fn has_distractors(&self) -> bool {
        true
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        let go = rng.gen_bool(self.go_probability);
        Trial::tap(go, json!({ "color": if go { "green" } else { "red" } }))
    }
}

/// Report which edge flashed
pub struct PeripheralFlash {
    eccentricity_deg: u32,
}

impl PeripheralFlash {
    /// Eccentricity grows with tier
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let eccentricity_deg = match tier {
            Tier::Beginner => 30,
            Tier::Advanced => 45,
            Tier::Elite => 60,
        };
        Self { eccentricity_deg }
    }
}

impl StimulusRule for PeripheralFlash {
    fn id(&self) -> DrillId {
        DrillId::PeripheralFlash
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Choice { options: 2 }
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        let side = rng.gen_range(0..2u32);
        Trial::choice(
            side,
            json!({ "side": SIDES[side as usize], "eccentricityDeg": self.eccentricity_deg }),
        )
    }
}

/// Report which of eight peripheral positions lit up, moving outward each round
pub struct PeripheralExpansion {
    start_deg: u32,
    step_deg: u32,
}

impl PeripheralExpansion {
    /// Starting eccentricity and growth per round
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let (start_deg, step_deg) = match tier {
            Tier::Beginner => (20, 2),
            Tier::Advanced => (30, 3),
            Tier::Elite => (40, 3),
        };
        Self {
            start_deg,
            step_deg,
        }
    }
}

impl StimulusRule for PeripheralExpansion {
    fn id(&self) -> DrillId {
        DrillId::PeripheralExpansion
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Choice { options: 8 }
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, round: u32) -> Trial {
        let position = rng.gen_range(0..8u32);
        let eccentricity = (self.start_deg + round * self.step_deg).min(90);
        Trial::choice(
            position,
            json!({ "position": position, "angleDeg": position * 45, "eccentricityDeg": eccentricity }),
        )
    }
}

/// Faint target present or absent, contrast dropping every round
pub struct ContrastSensitivity {
    start_contrast: f64,
}

impl ContrastSensitivity {
    /// Starting contrast by tier
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let start_contrast = match tier {
            Tier::Beginner => 50.0,
            Tier::Advanced => 30.0,
            Tier::Elite => 20.0,
        };
        Self { start_contrast }
    }
}

impl StimulusRule for ContrastSensitivity {
    fn id(&self) -> DrillId {
        DrillId::ContrastSensitivity
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Choice { options: 2 }
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, round: u32) -> Trial {
        let present = rng.gen_bool(0.5);
        let exponent = i32::try_from(round).unwrap_or(i32::MAX);
        let contrast = (self.start_contrast * 0.85_f64.powi(exponent)).max(2.0);
        Trial::choice(
            u32::from(present),
            json!({ "contrastPercent": contrast, "present": present }),
        )
    }
}

/// Centre arrow direction among congruent or incongruent flankers
pub struct FlankerFocus {
    congruent_probability: f64,
    flankers: u32,
}

impl FlankerFocus {
    /// More, and more often conflicting, flankers at higher tiers
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let (congruent_probability, flankers) = match tier {
            Tier::Beginner => (0.6, 2),
            Tier::Advanced => (0.5, 4),
            Tier::Elite => (0.35, 4),
        };
        Self {
            congruent_probability,
            flankers,
        }
    }
}

impl StimulusRule for FlankerFocus {
    fn id(&self) -> DrillId {
        DrillId::FlankerFocus
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Choice { options: 2 }
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        let direction = rng.gen_range(0..2u32);
        let congruent = rng.gen_bool(self.congruent_probability);
        let flanker = if congruent { direction } else { 1 - direction };
        Trial::choice(
            direction,
            json!({
                "centre": SIDES[direction as usize],
                "flankers": SIDES[flanker as usize],
                "flankerCount": self.flankers,
                "congruent": congruent,
            }),
        )
    }
}

/// Letter alternates sides; tap when it matches the target letter
pub struct SaccadeJump {
    target_letter: &'static str,
    right_side: bool,
}

impl SaccadeJump {
    /// Choose the target letter for the whole drill
    pub fn new(rng: &mut ChaCha8Rng) -> Self {
        Self {
            target_letter: LETTERS.choose(rng).copied().unwrap_or("E"),
            right_side: false,
        }
    }
}

impl StimulusRule for SaccadeJump {
    fn id(&self) -> DrillId {
        DrillId::SaccadeJump
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Tap
    }

    fn has_distractors(&self) -> bool {
        true
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        self.right_side = !self.right_side;
        let target = rng.gen_bool(0.4);
        let letter = if target {
            self.target_letter
        } else {
            pick_other(rng, &LETTERS, self.target_letter)
        };
        Trial::tap(
            target,
            json!({
                "letter": letter,
                "side": SIDES[usize::from(self.right_side)],
                "targetLetter": self.target_letter,
            }),
        )
    }
}

/// Near and far letters shown together; name the one at the active depth
pub struct NearFarFocus {
    options: u32,
    far_active: bool,
}

impl NearFarFocus {
    /// Larger letter set at higher tiers
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let options = match tier {
            Tier::Beginner => 4,
            Tier::Advanced => 6,
            Tier::Elite => 8,
        };
        Self {
            options,
            far_active: true,
        }
    }
}

impl StimulusRule for NearFarFocus {
    fn id(&self) -> DrillId {
        DrillId::NearFarFocus
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Choice {
            options: self.options,
        }
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        self.far_active = !self.far_active;
        let near = rng.gen_range(0..self.options);
        let far = (near + rng.gen_range(1..self.options)) % self.options;
        let answer = if self.far_active { far } else { near };
        Trial::choice(
            answer,
            json!({
                "nearLetter": LETTERS[near as usize],
                "farLetter": LETTERS[far as usize],
                "activeDepth": if self.far_active { "far" } else { "near" },
                "options": &LETTERS[..self.options as usize],
            }),
        )
    }
}

/// Orientation of a letter E moving across the screen
pub struct DynamicAcuity {
    speed_deg_per_sec: u32,
}

impl DynamicAcuity {
    /// Faster movement at higher tiers
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let speed_deg_per_sec = match tier {
            Tier::Beginner => 10,
            Tier::Advanced => 20,
            Tier::Elite => 30,
        };
        Self { speed_deg_per_sec }
    }
}

impl StimulusRule for DynamicAcuity {
    fn id(&self) -> DrillId {
        DrillId::DynamicAcuity
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Choice { options: 4 }
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        let orientation = rng.gen_range(0..4u32);
        let heading = rng.gen_range(0..360u32);
        Trial::choice(
            orientation,
            json!({
                "letter": "E",
                "rotationDeg": orientation * 90,
                "headingDeg": heading,
                "speedDegPerSec": self.speed_deg_per_sec,
            }),
        )
    }
}

/// Find the target cell in a grid of distractors
pub struct VisualSearch {
    grid: u32,
}

impl VisualSearch {
    /// Grid side length by tier
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let grid = match tier {
            Tier::Beginner => 3,
            Tier::Advanced => 4,
            Tier::Elite => 5,
        };
        Self { grid }
    }
}

impl StimulusRule for VisualSearch {
    fn id(&self) -> DrillId {
        DrillId::VisualSearch
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Choice {
            options: self.grid * self.grid,
        }
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        let cells = self.grid * self.grid;
        let cell = rng.gen_range(0..cells);
        Trial::choice(
            cell,
            json!({ "gridSize": self.grid, "targetCell": cell, "distractors": cells - 1 }),
        )
    }
}

/// Centre digit plus a peripheral flash; both answers must be right
pub struct SplitAttention {
    eccentricity_deg: u32,
}

impl SplitAttention {
    /// Peripheral flash moves outward at higher tiers
    #[must_use]
    pub const fn new(tier: Tier) -> Self {
        let eccentricity_deg = match tier {
            Tier::Beginner => 25,
            Tier::Advanced => 40,
            Tier::Elite => 55,
        };
        Self { eccentricity_deg }
    }
}

impl StimulusRule for SplitAttention {
    fn id(&self) -> DrillId {
        DrillId::SplitAttention
    }

    fn mode(&self) -> ResponseMode {
        ResponseMode::Dual
    }

    fn next_trial(&mut self, rng: &mut ChaCha8Rng, _round: u32) -> Trial {
        let digit = rng.gen_range(0..10u32);
        let side = rng.gen_range(0..2u32);
        Trial {
            target: true,
            answer: digit,
            secondary: side,
            display: json!({
                "digit": digit,
                "side": SIDES[side as usize],
                "eccentricityDeg": self.eccentricity_deg,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Waiting,
    Showing,
    Complete,
}

enum Judgement {
    Hit,
    Wrong,
    FalsePositive,
}

/// Engine running any [`StimulusRule`]
pub struct StimulusDrill {
    rule: Box<dyn StimulusRule>,
    rounds: u32,
    stimulus: Duration,
    gap: Duration,
    jitter_ms: u64,
    speed_factor: f64,
    rng: ChaCha8Rng,
    stage: Stage,
    trial: Option<Trial>,
    stage_started: Duration,
    next_onset: Duration,
    early_taps: u32,
    tally: Tally,
    guard: CompletionGuard,
}

impl StimulusDrill {
    /// Build the engine; the first stimulus follows one gap
    #[must_use]
    pub fn new(
        rule: Box<dyn StimulusRule>,
        timing: StimulusTiming,
        config: DrillConfig,
        rng: ChaCha8Rng,
    ) -> Self {
        let mut drill = Self {
            rule,
            rounds: timing.rounds,
            stimulus: config.scaled_ms(timing.stimulus_ms),
            gap: config.scaled_ms(timing.gap_ms),
            jitter_ms: timing.jitter_ms,
            speed_factor: config.speed_factor(),
            rng,
            stage: Stage::Waiting,
            trial: None,
            stage_started: Duration::ZERO,
            next_onset: Duration::ZERO,
            early_taps: 0,
            tally: Tally::default(),
            guard: CompletionGuard::new(),
        };
        drill.schedule_next(Duration::ZERO);
        drill
    }

    /// When the next stimulus is due (ms since drill start)
    #[must_use]
    pub fn next_onset_ms(&self) -> u64 {
        millis(self.next_onset)
    }

    fn schedule_next(&mut self, from: Duration) {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            self.rng.gen_range(0..=self.jitter_ms)
        };
        let jitter = Duration::from_millis((jitter as f64 * self.speed_factor).round() as u64);
        self.next_onset = from + self.gap + jitter;
    }

    fn present(&mut self) {
        let round = self.tally.attempts();
        let trial = self.rule.next_trial(&mut self.rng, round);
        trace!(drill = %self.rule.id(), round, "Stimulus presented");
        self.trial = Some(trial);
        self.stage = Stage::Showing;
        self.stage_started = self.next_onset;
    }

    fn time_out(&mut self) {
        let Some(trial) = self.trial.take() else {
            return;
        };
        if self.rule.mode() == ResponseMode::Tap && !trial.target {
            self.tally.correct_rejection();
        } else {
            self.tally.miss();
        }
    }

    fn finish_round(&mut self, at: Duration) -> Option<DrillOutcome> {
        if self.tally.attempts() >= self.rounds {
            return self.complete();
        }
        self.stage = Stage::Waiting;
        self.schedule_next(at);
        None
    }

    fn complete(&mut self) -> Option<DrillOutcome> {
        self.stage = Stage::Complete;
        self.trial = None;
        let with_false_positives = self.rule.has_distractors();
        let mut extra = DrillMetrics::new();
        extra.insert("earlyTaps".to_owned(), json!(self.early_taps));
        let tally = &self.tally;
        self.guard
            .complete(|| tally.outcome(with_false_positives, extra))
    }

    fn judge(&self, trial: &Trial, input: DrillInput) -> Option<Judgement> {
        let judgement = match (self.rule.mode(), input) {
            (ResponseMode::Tap, DrillInput::Tap) => {
                if trial.target {
                    Judgement::Hit
                } else {
                    Judgement::FalsePositive
                }
            }
            (ResponseMode::Choice { .. }, DrillInput::Choose { option }) => {
                if option == trial.answer {
                    Judgement::Hit
                } else {
                    Judgement::Wrong
                }
            }
            (ResponseMode::Dual, DrillInput::Dual { primary, secondary }) => {
                if primary == trial.answer && secondary == trial.secondary {
                    Judgement::Hit
                } else {
                    Judgement::Wrong
                }
            }
            _ => return None,
        };
        Some(judgement)
    }
}

impl Drill for StimulusDrill {
    fn id(&self) -> DrillId {
        self.rule.id()
    }

    fn advance(&mut self, now: Duration) -> Option<DrillOutcome> {
        loop {
            match self.stage {
                Stage::Waiting if now >= self.next_onset => self.present(),
                Stage::Showing if now >= self.stage_started + self.stimulus => {
                    let ended = self.stage_started + self.stimulus;
                    self.time_out();
                    if let Some(outcome) = self.finish_round(ended) {
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

        if self.stage != Stage::Showing {
            if input == DrillInput::Tap {
                self.early_taps += 1;
            }
            return None;
        }

        let trial = self.trial.take()?;
        let Some(judgement) = self.judge(&trial, input) else {
            self.trial = Some(trial);
            return None;
        };
        let reaction = now.saturating_sub(self.stage_started);
        match judgement {
            Judgement::Hit => self.tally.correct(Some(reaction)),
            Judgement::Wrong => self.tally.incorrect(),
            Judgement::FalsePositive => self.tally.false_positive(),
        }
        self.finish_round(now)
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
            Stage::Complete => DrillStage::Complete,
        };
        DrillView {
            drill: self.rule.id(),
            stage,
            round: self.tally.attempts(),
            total_rounds: self.rounds,
            stage_started_ms: millis(self.stage_started),
            stimulus: self.trial.as_ref().map(|t| t.display.clone()),
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

    #[test]
    fn test_higher_tiers_show_shorter_stimuli() {
        for kind in StimulusKind::ALL {
            let beginner = kind.timing(Tier::Beginner);
            let advanced = kind.timing(Tier::Advanced);
            let elite = kind.timing(Tier::Elite);
            assert!(beginner.stimulus_ms > advanced.stimulus_ms, "{kind:?}");
            assert!(advanced.stimulus_ms > elite.stimulus_ms, "{kind:?}");
            assert!(beginner.rounds <= elite.rounds, "{kind:?}");
        }
    }

    #[test]
    fn test_stimulus_appears_at_scheduled_onset() {
        let kind = StimulusKind::ReactionTap;
        let timing = kind.timing(Tier::Beginner);
        let mut drill = StimulusDrill::new(
            Box::new(ReactionTap),
            timing,
            DrillConfig::new(Tier::Beginner, 11),
            ChaCha8Rng::seed_from_u64(11),
        );
        let onset = drill.next_onset_ms();
        assert!(onset >= timing.gap_ms);
        assert!(onset <= timing.gap_ms + timing.jitter_ms);

        assert!(drill.advance(Duration::from_millis(onset - 1)).is_none());
        assert_eq!(drill.view().stage, DrillStage::Waiting);
        assert!(drill.advance(Duration::from_millis(onset)).is_none());
        let view = drill.view();
        assert_eq!(view.stage, DrillStage::Showing);
        assert_eq!(view.stage_started_ms, onset);

        assert!(drill
            .input(Duration::from_millis(onset + 200), DrillInput::Tap)
            .is_none());
        let next = drill.next_onset_ms();
        assert!(next >= onset + 200 + timing.gap_ms);
    }

    #[test]
    fn test_near_far_letters_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut rule = NearFarFocus::new(Tier::Beginner);
        for round in 0..50 {
            let trial = rule.next_trial(&mut rng, round);
            assert_ne!(trial.display["nearLetter"], trial.display["farLetter"]);
        }
    }
}
