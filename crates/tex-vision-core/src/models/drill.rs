// ABOUTME: Drill identifiers, difficulty tiers, and the normalized drill result record
// ABOUTME: DrillId is a closed enum so every lookup table over drills is checked for exhaustiveness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Free-form per-drill metrics (`correctHits`, `totalAttempts`, `streak`, ...)
pub type DrillMetrics = BTreeMap<String, serde_json::Value>;

/// Named difficulty bucket that deterministically scales every drill's constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Entry level
    #[default]
    Beginner,
    /// Intermediate athletes
    Advanced,
    /// Highest bucket
    Elite,
}

impl Tier {
    /// All tiers in ascending order
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Advanced, Self::Elite];

    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Advanced => "advanced",
            Self::Elite => "elite",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "advanced" => Ok(Self::Advanced),
            "elite" => Ok(Self::Elite),
            other => Err(AppError::invalid_input(format!(
                "Unknown tier '{other}', expected beginner, advanced or elite"
            ))),
        }
    }
}

/// Broad skill a drill trains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillCategory {
    /// Speed of response to a stimulus
    Reaction,
    /// Awareness outside the central field
    Peripheral,
    /// Following moving objects
    Tracking,
    /// Selective attention and focus switching
    Focus,
}

/// Every vision drill in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrillId {
    /// Tap when the flashed colour matches the target colour
    ColorFlash,
    /// Tap as soon as the light appears
    ReactionTap,
    /// Tap on green, hold on red
    GoNoGo,
    /// Report which edge flashed
    PeripheralFlash,
    /// Report which of eight peripheral positions lit up
    PeripheralExpansion,
    /// Detect a faint target
    ContrastSensitivity,
    /// Centre arrow direction, ignoring flankers
    FlankerFocus,
    /// Letter jumps between sides; tap on a match
    SaccadeJump,
    /// Identify the letter at the active depth
    NearFarFocus,
    /// Orientation of a moving letter
    DynamicAcuity,
    /// Find the target cell in a grid
    VisualSearch,
    /// Centre digit plus peripheral flash
    SplitAttention,
    /// Follow several targets among distractors
    MultipleObjectTracking,
    /// Predict where a moving ball exits
    BallTracking,
    /// Reproduce a growing light sequence
    SequenceRecall,
    /// Tap when the mover crosses the line
    AnticipationTiming,
}

impl DrillId {
    /// Every drill, in catalog order
    pub const ALL: [Self; 16] = [
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
        Self::MultipleObjectTracking,
        Self::BallTracking,
        Self::SequenceRecall,
        Self::AnticipationTiming,
    ];

    /// Stable string id
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ColorFlash => "color-flash",
            Self::ReactionTap => "reaction-tap",
            Self::GoNoGo => "go-no-go",
            Self::PeripheralFlash => "peripheral-flash",
            Self::PeripheralExpansion => "peripheral-expansion",
            Self::ContrastSensitivity => "contrast-sensitivity",
            Self::FlankerFocus => "flanker-focus",
            Self::SaccadeJump => "saccade-jump",
            Self::NearFarFocus => "near-far-focus",
            Self::DynamicAcuity => "dynamic-acuity",
            Self::VisualSearch => "visual-search",
            Self::SplitAttention => "split-attention",
            Self::MultipleObjectTracking => "multiple-object-tracking",
            Self::BallTracking => "ball-tracking",
            Self::SequenceRecall => "sequence-recall",
            Self::AnticipationTiming => "anticipation-timing",
        }
    }

    /// Title shown in the drill header
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ColorFlash => "Color Flash",
            Self::ReactionTap => "Reaction Tap",
            Self::GoNoGo => "Go / No-Go",
            Self::PeripheralFlash => "Peripheral Flash",
            Self::PeripheralExpansion => "Peripheral Expansion",
            Self::ContrastSensitivity => "Contrast Sensitivity",
            Self::FlankerFocus => "Flanker Focus",
            Self::SaccadeJump => "Saccade Jump",
            Self::NearFarFocus => "Near / Far Focus",
            Self::DynamicAcuity => "Dynamic Acuity",
            Self::VisualSearch => "Visual Search",
            Self::SplitAttention => "Split Attention",
            Self::MultipleObjectTracking => "Multiple Object Tracking",
            Self::BallTracking => "Ball Tracking",
            Self::SequenceRecall => "Sequence Recall",
            Self::AnticipationTiming => "Anticipation Timing",
        }
    }

    /// Skill category
    #[must_use]
    pub const fn category(self) -> DrillCategory {
        match self {
            Self::ColorFlash | Self::ReactionTap | Self::GoNoGo | Self::AnticipationTiming => {
                DrillCategory::Reaction
            }
            Self::PeripheralFlash | Self::PeripheralExpansion | Self::SplitAttention => {
                DrillCategory::Peripheral
            }
            Self::MultipleObjectTracking | Self::BallTracking | Self::DynamicAcuity => {
                DrillCategory::Tracking
            }
            Self::ContrastSensitivity
            | Self::FlankerFocus
            | Self::SaccadeJump
            | Self::NearFarFocus
            | Self::VisualSearch
            | Self::SequenceRecall => DrillCategory::Focus,
        }
    }
}

impl fmt::Display for DrillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrillId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| AppError::not_found(format!("Drill '{wanted}'")))
    }
}

/// Partial result emitted by a drill; the session adds drill type and tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DrillOutcome {
    /// Accuracy (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_percent: Option<f64>,
    /// Mean reaction time over correct responses (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_time_ms: Option<f64>,
    /// Responses to non-target stimuli
    #[serde(skip_serializing_if = "Option::is_none")]
    pub false_positives: Option<u32>,
    /// Drill-specific metrics
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub drill_metrics: DrillMetrics,
}

impl DrillOutcome {
    /// Number of user interactions recorded in the metrics
    #[must_use]
    pub fn interactions(&self) -> u32 {
        self.metric_u32("interactions")
    }

    /// Best run of consecutive correct rounds
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.metric_u32("streak")
    }

    /// Read an unsigned metric, 0 when absent or not a number
    #[must_use]
    pub fn metric_u32(&self, key: &str) -> u32 {
        self.drill_metrics
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    }
}

/// Normalized result of one drill attempt, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillResult {
    /// Which drill produced the result
    pub drill_type: DrillId,
    /// Tier it was played at
    pub tier: Tier,
    /// Accuracy (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_percent: Option<f64>,
    /// Mean reaction time (ms, > 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_time_ms: Option<f64>,
    /// Adaptive difficulty level the drill ran at (1-10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<u8>,
    /// Responses to non-target stimuli
    #[serde(skip_serializing_if = "Option::is_none")]
    pub false_positives: Option<u32>,
    /// Session fatigue after this drill (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue_score: Option<f64>,
    /// Drill-specific metrics
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub drill_metrics: DrillMetrics,
}

impl DrillResult {
    /// Attach drill type and tier to a drill's partial outcome
    #[must_use]
    pub fn from_outcome(drill_type: DrillId, tier: Tier, outcome: DrillOutcome) -> Self {
        Self {
            drill_type,
            tier,
            accuracy_percent: outcome.accuracy_percent,
            reaction_time_ms: outcome.reaction_time_ms,
            difficulty_level: None,
            false_positives: outcome.false_positives,
            fatigue_score: None,
            drill_metrics: outcome.drill_metrics,
        }
    }

    /// Record the difficulty level the drill was played at
    #[must_use]
    pub fn with_difficulty(mut self, level: u8) -> Self {
        self.difficulty_level = Some(level);
        self
    }

    /// Record session fatigue after the drill
    #[must_use]
    pub fn with_fatigue(mut self, fatigue: f64) -> Self {
        self.fatigue_score = Some(fatigue);
        self
    }
}

/// Celebration shown on the conclusion screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Celebration {
    /// 100% accuracy
    Perfect,
    /// An accuracy or reaction-time record was beaten
    #[serde(rename = "newPB")]
    NewPersonalBest,
    /// 90% accuracy or better
    Excellent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drill_ids_round_trip_through_strings() {
        for id in DrillId::ALL {
            assert_eq!(id.as_str().parse::<DrillId>().ok(), Some(id));
        }
    }

    #[test]
    fn test_unknown_drill_is_not_found() {
        let err = "laser-eyes".parse::<DrillId>().unwrap_err();
        assert_eq!(err.code, crate::errors::ErrorCode::ResourceNotFound);
    }

    #[test]
    fn test_serde_matches_string_ids() {
        let json = serde_json::to_string(&DrillId::MultipleObjectTracking).unwrap_or_default();
        assert_eq!(json, "\"multiple-object-tracking\"");
    }
}
