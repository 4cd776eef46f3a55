// ABOUTME: Core data models shared across the Tex Vision workspace
// ABOUTME: Drill identifiers and results, progress records, wellness quiz payloads, persisted rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Core data models

/// Drill identifiers, tiers and drill results
pub mod drill;

/// Personal bests and adaptive difficulty records
pub mod progress;

/// Wellness quiz types, sections and payloads
pub mod quiz;

/// Coach overrides and weight log rows
pub mod records;

pub use drill::{Celebration, DrillCategory, DrillId, DrillMetrics, DrillOutcome, DrillResult, Tier};
pub use progress::{DifficultyAdjustment, PersonalBest, PersonalBestAttempt, PersonalBestCheck};
pub use quiz::{
    PainLogEntry, QuizSection, QuizType, TrainingIntent, WellnessQuizPayload, WellnessQuizRecord,
};
pub use records::{CoachOverride, NewCoachOverride, NewWeightEntry, WeightEntry};
