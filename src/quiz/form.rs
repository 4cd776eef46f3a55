// ABOUTME: Wellness quiz form state with neutral defaults, pain map toggling and mini-test capture
// ABOUTME: Builds a payload holding only the active quiz type's fields and guards against double submit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::submit::QuizSubmitter;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tex_vision_core::body_map;
use tex_vision_core::constants::quiz::{
    PAIN_DEFAULT, PAIN_MAX, PAIN_MIN, RATING_DEFAULT, RATING_MAX, RATING_MIN, SLEEP_HOURS_DEFAULT,
    SLEEP_HOURS_MAX,
};
use tex_vision_core::errors::{AppError, AppResult};
use tex_vision_core::models::{
    QuizSection, QuizType, TrainingIntent, WellnessQuizPayload, WellnessQuizRecord,
};
use tex_vision_insights::{BalanceAnalysis, BalanceTest, CnsTest, CnsTestResult};
use tracing::{debug, warn};

/// A 1-5 rating on the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingField {
    /// Mental readiness
    MentalReadiness,
    /// Physical readiness
    PhysicalReadiness,
    /// Emotional readiness
    EmotionalReadiness,
    /// Sleep quality
    SleepQuality,
    /// Mood
    Mood,
    /// Energy
    EnergyLevel,
    /// Stress
    StressLevel,
    /// Soreness
    Soreness,
    /// Day rating
    DayRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ratings {
    mental: u8,
    physical: u8,
    emotional: u8,
    sleep_quality: u8,
    mood: u8,
    energy: u8,
    stress: u8,
    soreness: u8,
    day: u8,
}

impl Default for Ratings {
    fn default() -> Self {
        Self {
            mental: RATING_DEFAULT,
            physical: RATING_DEFAULT,
            emotional: RATING_DEFAULT,
            sleep_quality: RATING_DEFAULT,
            mood: RATING_DEFAULT,
            energy: RATING_DEFAULT,
            stress: RATING_DEFAULT,
            soreness: RATING_DEFAULT,
            day: RATING_DEFAULT,
        }
    }
}

impl Ratings {
    fn slot(&mut self, field: RatingField) -> &mut u8 {
        match field {
            RatingField::MentalReadiness => &mut self.mental,
            RatingField::PhysicalReadiness => &mut self.physical,
            RatingField::EmotionalReadiness => &mut self.emotional,
            RatingField::SleepQuality => &mut self.sleep_quality,
            RatingField::Mood => &mut self.mood,
            RatingField::EnergyLevel => &mut self.energy,
            RatingField::StressLevel => &mut self.stress,
            RatingField::Soreness => &mut self.soreness,
            RatingField::DayRating => &mut self.day,
        }
    }
}

/// State of one quiz dialog
#[derive(Debug, Clone)]
pub struct QuizForm {
    quiz_type: QuizType,
    entry_date: NaiveDate,
    ratings: Ratings,
    sleep_hours: f64,
    pain: BTreeMap<String, u8>,
    reaction: Option<CnsTestResult>,
    balance: Option<BalanceAnalysis>,
    training_intent: Option<TrainingIntent>,
    notes: String,
    in_flight: bool,
}

impl QuizForm {
    /// Form with every field at its default
    #[must_use]
    pub fn new(quiz_type: QuizType, entry_date: NaiveDate) -> Self {
        Self {
            quiz_type,
            entry_date,
            ratings: Ratings::default(),
            sleep_hours: SLEEP_HOURS_DEFAULT,
            pain: BTreeMap::new(),
            reaction: None,
            balance: None,
            training_intent: None,
            notes: String::new(),
            in_flight: false,
        }
    }

    /// Active quiz type
    #[must_use]
    pub const fn quiz_type(&self) -> QuizType {
        self.quiz_type
    }

    /// Current value of a rating
    #[must_use]
    pub fn rating(&self, field: RatingField) -> u8 {
        let mut ratings = self.ratings;
        *ratings.slot(field)
    }

    /// Set a 1-5 rating
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` outside 1-5
    pub fn set_rating(&mut self, field: RatingField, value: u8) -> AppResult<()> {
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(AppError::out_of_range(format!(
                "Rating must be between {RATING_MIN} and {RATING_MAX}, got {value}"
            )));
        }
        *self.ratings.slot(field) = value;
        Ok(())
    }

    /// Hours slept
    #[must_use]
    pub const fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }

    /// Set hours slept
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` outside 0-24
    pub fn set_sleep_hours(&mut self, hours: f64) -> AppResult<()> {
        if !(0.0..=SLEEP_HOURS_MAX).contains(&hours) {
            return Err(AppError::out_of_range(format!(
                "Sleep hours must be between 0 and {SLEEP_HOURS_MAX}, got {hours}"
            )));
        }
        self.sleep_hours = hours;
        Ok(())
    }

    /// Selected pain areas and their severities
    #[must_use]
    pub const fn pain(&self) -> &BTreeMap<String, u8> {
        &self.pain
    }

    /// Select or deselect a body area; returns whether it is now selected
    ///
    /// Selecting inserts the default severity, deselecting removes the entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an id not on the body map
    pub fn toggle_pain_area(&mut self, area: &str) -> AppResult<bool> {
        if !body_map::is_known_area(area) {
            return Err(AppError::invalid_input(format!("Unknown body area '{area}'")));
        }
        if self.pain.remove(area).is_some() {
            return Ok(false);
        }
        self.pain.insert(area.to_owned(), PAIN_DEFAULT);
        Ok(true)
    }

    /// Change the severity of a selected area
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` outside 1-10 and `InvalidState` when the area is not selected
    pub fn set_pain_severity(&mut self, area: &str, level: u8) -> AppResult<()> {
        if !(PAIN_MIN..=PAIN_MAX).contains(&level) {
            return Err(AppError::out_of_range(format!(
                "Pain severity must be between {PAIN_MIN} and {PAIN_MAX}, got {level}"
            )));
        }
        let Some(slot) = self.pain.get_mut(area) else {
            return Err(AppError::invalid_state(format!(
                "Body area '{area}' is not selected"
            )));
        };
        *slot = level;
        Ok(())
    }

    fn require_section(&self, section: QuizSection) -> AppResult<()> {
        if self.quiz_type.has_section(section) {
            return Ok(());
        }
        warn!(quiz_type = %self.quiz_type, ?section, "Mini test not part of this quiz");
        Err(AppError::invalid_state(format!(
            "The {} quiz has no {section:?} section",
            self.quiz_type
        )))
    }

    /// Score and keep a CNS tap test
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty or non-positive tap list and
    /// `InvalidState` when the quiz type has no reaction test
    pub fn record_reaction_test(&mut self, taps_ms: &[f64]) -> AppResult<CnsTestResult> {
        self.require_section(QuizSection::ReactionTest)?;
        let result = CnsTest::evaluate(taps_ms)?;
        self.reaction = Some(result);
        Ok(result)
    }

    /// Analyse and keep a balance test
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for negative holds and `InvalidState` when the
    /// quiz type has no balance test
    pub fn record_balance_test(
        &mut self,
        left_secs: f64,
        right_secs: f64,
    ) -> AppResult<BalanceAnalysis> {
        self.require_section(QuizSection::BalanceTest)?;
        let analysis = BalanceTest::analyze(left_secs, right_secs)?;
        self.balance = Some(analysis);
        Ok(analysis)
    }

    /// Planned training focus
    pub fn set_training_intent(&mut self, intent: Option<TrainingIntent>) {
        self.training_intent = intent;
    }

    /// Free-text notes
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Whether a submission is in progress
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Assemble the payload for the active quiz type
    #[must_use]
    pub fn build_payload(&self) -> WellnessQuizPayload {
        let mut payload = WellnessQuizPayload::empty(self.entry_date, self.quiz_type);
        let r = self.ratings;
        for section in self.quiz_type.sections() {
            match section {
                QuizSection::MentalReadiness => payload.mental_readiness = Some(r.mental),
                QuizSection::PhysicalReadiness => payload.physical_readiness = Some(r.physical),
                QuizSection::EmotionalReadiness => payload.emotional_readiness = Some(r.emotional),
                QuizSection::Sleep => {
                    payload.sleep_quality = Some(r.sleep_quality);
                    payload.sleep_hours = Some(self.sleep_hours);
                }
                QuizSection::Mood => {
                    payload.mood = Some(r.mood);
                    payload.energy_level = Some(r.energy);
                }
                QuizSection::Stress => payload.stress_level = Some(r.stress),
                QuizSection::Soreness => payload.soreness = Some(r.soreness),
                QuizSection::DayReflection => payload.day_rating = Some(r.day),
                QuizSection::PainMap => {
                    payload.pain_location = self.pain.keys().cloned().collect();
                    payload.pain_scales.clone_from(&self.pain);
                }
                QuizSection::ReactionTest => {
                    if let Some(test) = self.reaction {
                        payload.reaction_avg_ms = Some(test.average_ms);
                        payload.cns_score = Some(test.score);
                    }
                }
                QuizSection::BalanceTest => {
                    if let Some(test) = self.balance {
                        payload.balance_left_secs = Some(test.left_secs);
                        payload.balance_right_secs = Some(test.right_secs);
                        payload.balance_asymmetry_percent = Some(test.percent_diff);
                    }
                }
                QuizSection::TrainingIntent => payload.training_intent = self.training_intent,
                QuizSection::Notes => {
                    let notes = self.notes.trim();
                    if !notes.is_empty() {
                        payload.notes = Some(notes.to_owned());
                    }
                }
            }
        }
        payload
    }

    /// Mark a submission as started and hand out the frozen payload
    ///
    /// # Errors
    ///
    /// Returns `ResourceLocked` while a submission is already in flight
    pub fn begin_submit(&mut self) -> AppResult<WellnessQuizPayload> {
        if self.in_flight {
            return Err(AppError::locked("A quiz submission is already in progress"));
        }
        self.in_flight = true;
        Ok(self.build_payload())
    }

    /// Clear the in-flight flag; a successful submission resets the form
    pub fn finish_submit(&mut self, success: bool) {
        self.in_flight = false;
        if success {
            *self = Self::new(self.quiz_type, self.entry_date);
        }
    }

    /// Submit through `submitter`, resetting on success and keeping state on failure
    ///
    /// # Errors
    ///
    /// Returns `ResourceLocked` if a submission is in flight, otherwise the submitter's error
    pub async fn submit(&mut self, submitter: &dyn QuizSubmitter) -> AppResult<WellnessQuizRecord> {
        let payload = self.begin_submit()?;
        match submitter.submit(payload).await {
            Ok(record) => {
                debug!(quiz_type = %self.quiz_type, id = %record.id, "Quiz submitted");
                self.finish_submit(true);
                Ok(record)
            }
            Err(e) => {
                warn!(quiz_type = %self.quiz_type, error = %e, "Quiz submission failed");
                self.finish_submit(false);
                Err(e)
            }
        }
    }
}

/// Sections and defaults for rendering an empty quiz
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizTemplate {
    /// Quiz type
    pub quiz_type: QuizType,
    /// Sections in display order
    pub sections: &'static [QuizSection],
    /// Payload a fresh form would submit
    pub defaults: WellnessQuizPayload,
}

impl QuizTemplate {
    /// Template for a quiz type dated `entry_date`
    #[must_use]
    pub fn for_type(quiz_type: QuizType, entry_date: NaiveDate) -> Self {
        Self {
            quiz_type,
            sections: quiz_type.sections(),
            defaults: QuizForm::new(quiz_type, entry_date).build_payload(),
        }
    }
}
