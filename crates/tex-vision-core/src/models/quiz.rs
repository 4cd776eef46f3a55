// ABOUTME: Wellness quiz types, their sections, and the submitted payload shape
// ABOUTME: Only the fields belonging to the active quiz type are populated on submit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::constants::quiz::{PAIN_MAX, PAIN_MIN, RATING_MAX, RATING_MIN, SLEEP_HOURS_MAX};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Which check-in the athlete is filling in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
    /// Before a lifting session
    PreLift,
    /// End of day
    Night,
    /// After waking
    Morning,
}

impl QuizType {
    /// Every quiz type
    pub const ALL: [Self; 3] = [Self::PreLift, Self::Night, Self::Morning];

    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreLift => "pre_lift",
            Self::Night => "night",
            Self::Morning => "morning",
        }
    }

    /// Sections rendered for this quiz type, in display order
    #[must_use]
    pub const fn sections(self) -> &'static [QuizSection] {
        match self {
            Self::PreLift => &[
                QuizSection::MentalReadiness,
                QuizSection::PhysicalReadiness,
                QuizSection::EmotionalReadiness,
                QuizSection::PainMap,
                QuizSection::ReactionTest,
                QuizSection::BalanceTest,
                QuizSection::TrainingIntent,
                QuizSection::Notes,
            ],
            Self::Night => &[
                QuizSection::Mood,
                QuizSection::Stress,
                QuizSection::Soreness,
                QuizSection::DayReflection,
                QuizSection::PainMap,
                QuizSection::Notes,
            ],
            Self::Morning => &[
                QuizSection::Sleep,
                QuizSection::Mood,
                QuizSection::Soreness,
                QuizSection::PainMap,
                QuizSection::ReactionTest,
                QuizSection::Notes,
            ],
        }
    }

    /// Whether this quiz type renders the given section
    #[must_use]
    pub fn has_section(self, section: QuizSection) -> bool {
        self.sections().contains(&section)
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pre_lift" => Ok(Self::PreLift),
            "night" => Ok(Self::Night),
            "morning" => Ok(Self::Morning),
            other => Err(AppError::invalid_input(format!("Unknown quiz type '{other}'"))),
        }
    }
}

/// A block of related questions in the quiz dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizSection {
    /// Focus and motivation (1-5)
    MentalReadiness,
    /// How the body feels (1-5)
    PhysicalReadiness,
    /// Emotional state (1-5)
    EmotionalReadiness,
    /// Sleep quality (1-5) and hours slept
    Sleep,
    /// Mood and energy (1-5)
    Mood,
    /// Stress level (1-5)
    Stress,
    /// General muscle soreness (1-5)
    Soreness,
    /// Rating of the day (1-5)
    DayReflection,
    /// Body map with per-area severity
    PainMap,
    /// CNS tap reaction test
    ReactionTest,
    /// Single-leg balance test
    BalanceTest,
    /// Planned focus of the session
    TrainingIntent,
    /// Free text
    Notes,
}

/// Planned focus of a lifting session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingIntent {
    /// Light work to recover
    Recovery,
    /// Skill and form
    Technique,
    /// Heavy strength work
    Strength,
    /// Explosive work
    Power,
    /// Competition or testing day
    Competition,
}

/// Submitted wellness check-in, one row per submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessQuizPayload {
    /// Calendar day the entry belongs to
    pub entry_date: NaiveDate,
    /// Which check-in this is
    pub quiz_type: QuizType,
    /// Focus and motivation (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mental_readiness: Option<u8>,
    /// How the body feels (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_readiness: Option<u8>,
    /// Emotional state (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_readiness: Option<u8>,
    /// Sleep quality (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<u8>,
    /// Hours slept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    /// Mood (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    /// Energy (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<u8>,
    /// Stress (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<u8>,
    /// Muscle soreness (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soreness: Option<u8>,
    /// Rating of the day (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_rating: Option<u8>,
    /// Body areas reporting pain
    #[serde(default)]
    pub pain_location: Vec<String>,
    /// Severity (1-10) per body area id
    #[serde(default)]
    pub pain_scales: BTreeMap<String, u8>,
    /// Mean of the CNS reaction taps (ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_avg_ms: Option<f64>,
    /// CNS readiness score (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cns_score: Option<f64>,
    /// Left-leg balance hold (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_left_secs: Option<f64>,
    /// Right-leg balance hold (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_right_secs: Option<f64>,
    /// Left/right difference (percent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_asymmetry_percent: Option<f64>,
    /// Planned focus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_intent: Option<TrainingIntent>,
    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl WellnessQuizPayload {
    /// Empty payload for a quiz type, every optional field unset
    #[must_use]
    pub const fn empty(entry_date: NaiveDate, quiz_type: QuizType) -> Self {
        Self {
            entry_date,
            quiz_type,
            mental_readiness: None,
            physical_readiness: None,
            emotional_readiness: None,
            sleep_quality: None,
            sleep_hours: None,
            mood: None,
            energy_level: None,
            stress_level: None,
            soreness: None,
            day_rating: None,
            pain_location: Vec::new(),
            pain_scales: BTreeMap::new(),
            reaction_avg_ms: None,
            cns_score: None,
            balance_left_secs: None,
            balance_right_secs: None,
            balance_asymmetry_percent: None,
            training_intent: None,
            notes: None,
        }
    }

    /// Check every populated field against its scale
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` naming the first field outside its bounds
    pub fn validate(&self) -> AppResult<()> {
        let ratings = [
            ("mental_readiness", self.mental_readiness),
            ("physical_readiness", self.physical_readiness),
            ("emotional_readiness", self.emotional_readiness),
            ("sleep_quality", self.sleep_quality),
            ("mood", self.mood),
            ("energy_level", self.energy_level),
            ("stress_level", self.stress_level),
            ("soreness", self.soreness),
            ("day_rating", self.day_rating),
        ];
        for (field, value) in ratings {
            if let Some(v) = value {
                if !(RATING_MIN..=RATING_MAX).contains(&v) {
                    return Err(AppError::out_of_range(format!(
                        "{field} must be between {RATING_MIN} and {RATING_MAX}, got {v}"
                    )));
                }
            }
        }

        for (area, level) in &self.pain_scales {
            if !(PAIN_MIN..=PAIN_MAX).contains(level) {
                return Err(AppError::out_of_range(format!(
                    "Pain level for {area} must be between {PAIN_MIN} and {PAIN_MAX}, got {level}"
                )));
            }
        }

        if let Some(hours) = self.sleep_hours {
            if !(0.0..=SLEEP_HOURS_MAX).contains(&hours) {
                return Err(AppError::out_of_range(format!(
                    "sleep_hours must be between 0 and {SLEEP_HOURS_MAX}, got {hours}"
                )));
            }
        }
        Ok(())
    }
}

/// Persisted wellness quiz row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessQuizRecord {
    /// Row id
    pub id: Uuid,
    /// Owning athlete
    pub user_id: Uuid,
    /// Insert time
    pub created_at: DateTime<Utc>,
    /// Submitted answers
    #[serde(flatten)]
    pub payload: WellnessQuizPayload,
}

/// Pain slice of a quiz row, the input to heat-map and pattern analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PainLogEntry {
    /// Calendar day
    pub entry_date: NaiveDate,
    /// Areas reporting pain
    pub pain_location: Vec<String>,
    /// Severity per area
    pub pain_scales: BTreeMap<String, u8>,
}

impl PainLogEntry {
    /// Areas logged on this entry, listed or scored, without duplicates
    #[must_use]
    pub fn areas(&self) -> Vec<&str> {
        let mut areas: Vec<&str> = self
            .pain_location
            .iter()
            .map(String::as_str)
            .chain(self.pain_scales.keys().map(String::as_str))
            .collect();
        areas.sort_unstable();
        areas.dedup();
        areas
    }
}

impl From<&WellnessQuizPayload> for PainLogEntry {
    fn from(payload: &WellnessQuizPayload) -> Self {
        Self {
            entry_date: payload.entry_date,
            pain_location: payload.pain_location.clone(),
            pain_scales: payload.pain_scales.clone(),
        }
    }
}

impl From<&WellnessQuizRecord> for PainLogEntry {
    fn from(record: &WellnessQuizRecord) -> Self {
        Self::from(&record.payload)
    }
}
