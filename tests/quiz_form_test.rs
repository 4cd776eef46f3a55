// ABOUTME: Integration tests for the wellness quiz form and its submission guard
// ABOUTME: Covers defaults, per-type payload fields, pain map toggling and double-submit protection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tex_vision::database::{MemoryRepository, QuizFilter, WellnessRepository};
use tex_vision::quiz::{QuizForm, QuizSubmitter, QuizTemplate, RatingField, RepositorySubmitter};
use tex_vision_core::errors::{AppError, AppResult, ErrorCode};
use tex_vision_core::models::{
    QuizSection, QuizType, TrainingIntent, WellnessQuizPayload, WellnessQuizRecord,
};
use uuid::Uuid;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 14).unwrap()
}

struct FailingSubmitter {
    calls: AtomicU32,
}

#[async_trait]
impl QuizSubmitter for FailingSubmitter {
    async fn submit(&self, _payload: WellnessQuizPayload) -> AppResult<WellnessQuizRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::database("disk full"))
    }
}

#[test]
fn test_defaults_are_neutral() {
    let form = QuizForm::new(QuizType::PreLift, day());
    assert_eq!(form.rating(RatingField::MentalReadiness), 3);
    assert!((form.sleep_hours() - 8.0).abs() < f64::EPSILON);
    assert!(form.pain().is_empty());
    assert!(!form.is_submitting());
}

#[test]
fn test_payload_holds_only_active_sections() {
    let form = QuizForm::new(QuizType::Night, day());
    let payload = form.build_payload();

    assert_eq!(payload.quiz_type, QuizType::Night);
    assert_eq!(payload.entry_date, day());
    assert_eq!(payload.mood, Some(3));
    assert_eq!(payload.stress_level, Some(3));
    assert_eq!(payload.day_rating, Some(3));
    assert_eq!(payload.mental_readiness, None);
    assert_eq!(payload.sleep_hours, None);
    assert_eq!(payload.training_intent, None);
    assert_eq!(payload.notes, None);

    let morning = QuizForm::new(QuizType::Morning, day()).build_payload();
    assert_eq!(morning.sleep_hours, Some(8.0));
    assert_eq!(morning.sleep_quality, Some(3));
    assert_eq!(morning.day_rating, None);
}

#[test]
fn test_rating_bounds() {
    let mut form = QuizForm::new(QuizType::PreLift, day());
    form.set_rating(RatingField::PhysicalReadiness, 5).unwrap();
    assert_eq!(form.rating(RatingField::PhysicalReadiness), 5);

    let err = form.set_rating(RatingField::PhysicalReadiness, 6).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    let err = form.set_rating(RatingField::Mood, 0).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);

    let err = form.set_sleep_hours(25.0).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

#[test]
fn test_pain_area_toggle_and_severity() {
    let mut form = QuizForm::new(QuizType::PreLift, day());
    assert!(form.toggle_pain_area("left-knee").unwrap());
    assert_eq!(form.pain().get("left-knee"), Some(&5));

    form.set_pain_severity("left-knee", 8).unwrap();
    let payload = form.build_payload();
    assert_eq!(payload.pain_location, vec!["left-knee".to_owned()]);
    assert_eq!(payload.pain_scales.get("left-knee"), Some(&8));

    assert!(!form.toggle_pain_area("left-knee").unwrap());
    assert!(form.pain().is_empty());

    let err = form.set_pain_severity("left-knee", 4).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    let err = form.toggle_pain_area("tail").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    form.toggle_pain_area("neck").unwrap();
    let err = form.set_pain_severity("neck", 11).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

#[test]
fn test_mini_tests_feed_payload() {
    let mut form = QuizForm::new(QuizType::PreLift, day());
    let cns = form.record_reaction_test(&[240.0, 260.0]).unwrap();
    assert!((cns.average_ms - 250.0).abs() < f64::EPSILON);
    let balance = form.record_balance_test(30.0, 20.0).unwrap();
    assert!(balance.significant);
    form.set_training_intent(Some(TrainingIntent::Strength));
    form.set_notes("  felt sharp  ");

    let payload = form.build_payload();
    assert_eq!(payload.reaction_avg_ms, Some(250.0));
    assert_eq!(payload.cns_score, Some(cns.score));
    assert_eq!(payload.balance_left_secs, Some(30.0));
    assert_eq!(payload.balance_right_secs, Some(20.0));
    assert!(payload.balance_asymmetry_percent.is_some());
    assert_eq!(payload.training_intent, Some(TrainingIntent::Strength));
    assert_eq!(payload.notes.as_deref(), Some("felt sharp"));
}

#[test]
fn test_mini_tests_rejected_outside_their_quiz() {
    let mut night = QuizForm::new(QuizType::Night, day());
    let err = night.record_balance_test(30.0, 10.0).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    let err = night.record_reaction_test(&[240.0]).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    assert_eq!(night.build_payload().balance_left_secs, None);

    let mut morning = QuizForm::new(QuizType::Morning, day());
    assert!(morning.record_reaction_test(&[240.0, 260.0]).is_ok());
    let err = morning.record_balance_test(30.0, 10.0).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    assert_eq!(morning.build_payload().reaction_avg_ms, Some(250.0));
}

#[test]
fn test_begin_submit_locks_until_finished() {
    let mut form = QuizForm::new(QuizType::Night, day());
    form.set_rating(RatingField::Mood, 5).unwrap();

    form.begin_submit().unwrap();
    assert!(form.is_submitting());
    let err = form.begin_submit().unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceLocked);

    form.finish_submit(false);
    assert!(!form.is_submitting());
    assert_eq!(form.rating(RatingField::Mood), 5, "failure keeps answers");

    form.begin_submit().unwrap();
    form.finish_submit(true);
    assert_eq!(form.rating(RatingField::Mood), 3, "success resets answers");
}

#[tokio::test]
async fn test_submit_persists_and_resets() {
    let repo: Arc<dyn WellnessRepository> = Arc::new(MemoryRepository::new());
    let user = Uuid::new_v4();
    let submitter = RepositorySubmitter::new(Arc::clone(&repo), user);

    let mut form = QuizForm::new(QuizType::Morning, day());
    form.set_sleep_hours(6.5).unwrap();
    form.toggle_pain_area("lower-back").unwrap();
    let record = form.submit(&submitter).await.unwrap();

    assert_eq!(record.user_id, user);
    assert_eq!(record.payload.sleep_hours, Some(6.5));
    assert!(form.pain().is_empty());

    let stored = repo.list_quizzes(user, QuizFilter::default()).await.unwrap();
    assert_eq!(stored, vec![record]);
}

#[tokio::test]
async fn test_failed_submit_keeps_state() {
    let submitter = FailingSubmitter {
        calls: AtomicU32::new(0),
    };
    let mut form = QuizForm::new(QuizType::Night, day());
    form.set_rating(RatingField::StressLevel, 1).unwrap();

    let err = form.submit(&submitter).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DatabaseError);
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(form.rating(RatingField::StressLevel), 1);
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn test_repository_submitter_rejects_out_of_range() {
    let repo: Arc<dyn WellnessRepository> = Arc::new(MemoryRepository::new());
    let submitter = RepositorySubmitter::new(repo, Uuid::new_v4());
    let mut payload = WellnessQuizPayload::empty(Utc::now().date_naive(), QuizType::Night);
    payload.mood = Some(9);

    let err = submitter.submit(payload).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

#[test]
fn test_template_lists_sections_and_defaults() {
    let template = QuizTemplate::for_type(QuizType::PreLift, day());
    assert_eq!(template.sections, QuizType::PreLift.sections());
    assert!(template.sections.contains(&QuizSection::BalanceTest));
    assert_eq!(template.defaults.mental_readiness, Some(3));
    assert_eq!(template.defaults.reaction_avg_ms, None);
}
