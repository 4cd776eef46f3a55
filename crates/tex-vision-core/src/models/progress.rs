// ABOUTME: Personal-best records and adaptive difficulty adjustment types
// ABOUTME: Shared by the session orchestrator and the in-memory progress collaborators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction the adaptive difficulty engine recommends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyAdjustment {
    /// Raise the level by one
    Increase,
    /// Lower the level by one
    Decrease,
    /// Keep the level
    #[default]
    Stable,
}

/// Best recorded performance for one drill and tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBest {
    /// Highest accuracy (percent)
    pub best_accuracy: f64,
    /// Fastest mean reaction time (ms)
    pub best_reaction_time_ms: Option<f64>,
    /// Longest run of consecutive correct rounds
    pub best_streak: u32,
    /// Attempts recorded so far
    pub attempts: u32,
    /// When any record last changed
    pub updated_at: DateTime<Utc>,
}

/// Numbers from one attempt, checked against the personal best
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBestAttempt {
    /// Accuracy (percent)
    pub accuracy: f64,
    /// Mean reaction time (ms)
    pub reaction_time_ms: Option<f64>,
    /// Best streak within the attempt
    pub streak: u32,
}

/// Outcome of comparing an attempt with the stored personal best
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBestCheck {
    /// Accuracy beat the previous best
    pub is_new_accuracy_record: bool,
    /// Reaction time beat (was lower than) the previous best
    pub is_new_reaction_record: bool,
    /// Streak beat the previous best
    pub is_new_streak_record: bool,
    /// Record before this attempt, `None` on the first attempt
    pub previous_best: Option<PersonalBest>,
}

impl PersonalBestCheck {
    /// Accuracy or reaction time improved
    #[must_use]
    pub const fn beat_headline_record(&self) -> bool {
        self.is_new_accuracy_record || self.is_new_reaction_record
    }
}
