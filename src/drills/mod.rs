// ABOUTME: Drill contract shared by all 16 vision drills and the session orchestrator
// ABOUTME: Tick-driven engines emit a DrillOutcome at most once through a CompletionGuard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! # Vision drills
//!
//! Every drill is driven by a single clock. The session calls
//! [`Drill::advance`] with the elapsed time since the drill started,
//! [`Drill::input`] for user events and [`Drill::expire`] when the external
//! duration timer runs out. Each of those may return the drill's
//! [`DrillOutcome`], and across all three it is returned at most once.
//!
//! Drills are grouped into four engine families:
//!
//! - **stimulus**: timed stimuli judged by a per-drill rule
//! - **tracking**: moving objects followed by the athlete
//! - **sequence**: growing light sequences reproduced from memory
//! - **timing**: tapping as a mover crosses a line

/// Outcome normalisation and the at-most-once completion guard
pub mod engine;

/// Compile-time drill registry and tier constants
pub mod registry;

/// Stimulus-response engine and its twelve rules
pub mod stimulus;

/// Multiple-object tracking and ball tracking
pub mod tracking;

/// Sequence recall
pub mod sequence;

/// Anticipation timing
pub mod timing;

pub use engine::CompletionGuard;
pub use registry::{build_drill, DrillFamily, TierProfile};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tex_vision_core::constants::difficulty::{DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};
use tex_vision_core::models::{DrillId, DrillOutcome, Tier};

/// Parameters a drill is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Tier that selects the drill's constants
    pub tier: Tier,
    /// Adaptive difficulty (1-10), scales presentation speed only
    pub difficulty_level: Option<u8>,
    /// Seed for every random choice the drill makes
    pub seed: u64,
}

impl DrillConfig {
    /// Config at a tier with no difficulty override
    #[must_use]
    pub const fn new(tier: Tier, seed: u64) -> Self {
        Self {
            tier,
            difficulty_level: None,
            seed,
        }
    }

    /// Set the difficulty level
    #[must_use]
    pub const fn with_difficulty(mut self, level: u8) -> Self {
        self.difficulty_level = Some(level);
        self
    }

    /// Multiplier applied to presentation durations
    ///
    /// Level 5 (or none) leaves timings untouched. Each level above 5 makes
    /// presentations 5% shorter, each level below makes them 5% longer.
    #[must_use]
    pub fn speed_factor(&self) -> f64 {
        let level = self
            .difficulty_level
            .unwrap_or(DEFAULT_LEVEL)
            .clamp(MIN_LEVEL, MAX_LEVEL);
        1.0 + f64::from(i16::from(DEFAULT_LEVEL) - i16::from(level)) * 0.05
    }

    /// Scale a tier duration (ms) by the speed factor
    #[must_use]
    pub fn scaled_ms(&self, ms: u64) -> Duration {
        Duration::from_millis((ms as f64 * self.speed_factor()).round() as u64)
    }
}

/// A user event forwarded to the active drill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrillInput {
    /// Generic response tap
    Tap,
    /// Pick one of the drill's options (side, position, letter, cell, zone, pad)
    Choose {
        /// Option index
        option: u32,
    },
    /// Two-part answer (centre digit plus peripheral side)
    Dual {
        /// Centre answer
        primary: u32,
        /// Peripheral answer
        secondary: u32,
    },
    /// Mark a tracked object as a target
    Select {
        /// Object index
        object: u32,
    },
    /// Finish the current selection early
    Confirm,
}

/// Where a drill currently is within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillStage {
    /// Between stimuli or rounds
    Waiting,
    /// A stimulus is on screen and accepting responses
    Showing,
    /// Targets are highlighted before they start moving
    Highlight,
    /// Objects are moving
    Tracking,
    /// Waiting for the athlete's answer
    Responding,
    /// The drill has completed
    Complete,
}

/// Snapshot of a drill for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillView {
    /// Drill being played
    pub drill: DrillId,
    /// Current stage
    pub stage: DrillStage,
    /// Rounds already judged
    pub round: u32,
    /// Rounds in the drill
    pub total_rounds: u32,
    /// When the current stimulus or round stage began (ms since drill start)
    pub stage_started_ms: u64,
    /// Drill-specific display data for the current stage
    pub stimulus: Option<serde_json::Value>,
}

/// A playable vision drill
pub trait Drill: Send + Sync {
    /// Which drill this is
    fn id(&self) -> DrillId;

    /// Move the drill's timers to `now`
    fn advance(&mut self, now: Duration) -> Option<DrillOutcome>;

    /// Apply a user event that happened at `now`
    fn input(&mut self, now: Duration, input: DrillInput) -> Option<DrillOutcome>;

    /// Finish early because the session's duration timer ran out
    fn expire(&mut self) -> Option<DrillOutcome>;

    /// Current rendering snapshot
    fn view(&self) -> DrillView;

    /// Whether the outcome has been emitted
    fn is_complete(&self) -> bool;
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
