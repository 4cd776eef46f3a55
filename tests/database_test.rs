// ABOUTME: Integration tests for the wellness repositories
// ABOUTME: Runs the same scenarios against the in-memory and SQLite backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::TempDir;
use tex_vision::database::{
    connect, DatabaseType, MemoryRepository, QuizFilter, SqliteRepository, WellnessRepository,
};
use tex_vision_core::errors::ErrorCode;
use tex_vision_core::models::{
    NewCoachOverride, NewWeightEntry, QuizType, TrainingIntent, WellnessQuizPayload,
};
use uuid::Uuid;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
}

async fn backends() -> Vec<Arc<dyn WellnessRepository>> {
    let sqlite = SqliteRepository::connect("sqlite::memory:").await.unwrap();
    sqlite.migrate().await.unwrap();
    vec![Arc::new(MemoryRepository::new()), Arc::new(sqlite)]
}

fn pre_lift(day: u32) -> WellnessQuizPayload {
    let mut payload = WellnessQuizPayload::empty(date(day), QuizType::PreLift);
    payload.mental_readiness = Some(4);
    payload.physical_readiness = Some(3);
    payload.emotional_readiness = Some(5);
    payload.pain_location = vec!["lower-back".to_owned()];
    payload.pain_scales.insert("lower-back".to_owned(), 6);
    payload.training_intent = Some(TrainingIntent::Strength);
    payload.notes = Some("tight hamstrings".to_owned());
    payload
}

fn night(day: u32) -> WellnessQuizPayload {
    let mut payload = WellnessQuizPayload::empty(date(day), QuizType::Night);
    payload.mood = Some(3);
    payload.stress_level = Some(2);
    payload
}

#[tokio::test]
async fn test_quiz_round_trip_keeps_payload() {
    for repo in backends().await {
        let user = Uuid::new_v4();
        let stored = repo.insert_quiz(user, pre_lift(3)).await.unwrap();
        assert_eq!(stored.user_id, user);

        let rows = repo.list_quizzes(user, QuizFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1, "backend {}", repo.backend_name());
        assert_eq!(rows[0].id, stored.id);
        assert_eq!(rows[0].payload, pre_lift(3));
    }
}

#[tokio::test]
async fn test_quizzes_are_scoped_by_user_and_sorted_by_date() {
    for repo in backends().await {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.insert_quiz(user, night(9)).await.unwrap();
        repo.insert_quiz(user, pre_lift(2)).await.unwrap();
        repo.insert_quiz(other, night(5)).await.unwrap();
        repo.insert_quiz(user, night(4)).await.unwrap();

        let days: Vec<NaiveDate> = repo
            .list_quizzes(user, QuizFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|r| r.payload.entry_date)
            .collect();
        assert_eq!(days, vec![date(2), date(4), date(9)], "backend {}", repo.backend_name());
    }
}

#[tokio::test]
async fn test_quiz_filters() {
    for repo in backends().await {
        let user = Uuid::new_v4();
        for day in [1, 3, 5, 7] {
            repo.insert_quiz(user, night(day)).await.unwrap();
        }
        repo.insert_quiz(user, pre_lift(6)).await.unwrap();

        let since = repo.list_quizzes(user, QuizFilter::since(date(5))).await.unwrap();
        assert_eq!(since.len(), 3);
        assert!(since.iter().all(|r| r.payload.entry_date >= date(5)));

        let pre = repo
            .list_quizzes(
                user,
                QuizFilter {
                    quiz_type: Some(QuizType::PreLift),
                    ..QuizFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(pre.len(), 1);
        assert_eq!(pre[0].payload.quiz_type, QuizType::PreLift);

        let latest = repo
            .list_quizzes(
                user,
                QuizFilter {
                    quiz_type: Some(QuizType::Night),
                    limit: Some(2),
                    ..QuizFilter::default()
                },
            )
            .await
            .unwrap();
        let days: Vec<NaiveDate> = latest.iter().map(|r| r.payload.entry_date).collect();
        assert_eq!(days, vec![date(5), date(7)], "backend {}", repo.backend_name());
    }
}

#[tokio::test]
async fn test_invalid_quiz_is_rejected() {
    for repo in backends().await {
        let user = Uuid::new_v4();
        let mut payload = night(1);
        payload.mood = Some(9);
        let err = repo.insert_quiz(user, payload).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(repo
            .list_quizzes(user, QuizFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}

#[tokio::test]
async fn test_weight_log() {
    for repo in backends().await {
        let user = Uuid::new_v4();
        for (day, lbs) in [(10, 181.5), (8, 183.0)] {
            repo.insert_weight(
                user,
                NewWeightEntry {
                    entry_date: date(day),
                    weight_lbs: lbs,
                },
            )
            .await
            .unwrap();
        }

        let rows = repo.list_weights(user).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entry_date, date(8));
        assert!((rows[0].weight_lbs - 183.0).abs() < f64::EPSILON);

        let err = repo
            .insert_weight(
                user,
                NewWeightEntry {
                    entry_date: date(11),
                    weight_lbs: 0.0,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(repo.list_weights(Uuid::new_v4()).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_coach_overrides() {
    for repo in backends().await {
        let user = Uuid::new_v4();
        let request = NewCoachOverride {
            session_id: Uuid::new_v4(),
            coach_id: Uuid::new_v4(),
            original_grade: "B".to_owned(),
            override_grade: "A-".to_owned(),
            override_reason: Some("Clean tracking despite fatigue".to_owned()),
        };
        let stored = repo
            .insert_coach_override(user, request.clone())
            .await
            .unwrap();
        assert_eq!(stored.override_grade, "A-");

        let rows = repo.list_coach_overrides(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].session_id, request.session_id);
        assert_eq!(rows[0].override_reason, request.override_reason);

        let blank = NewCoachOverride {
            override_grade: "  ".to_owned(),
            ..request
        };
        let err = repo.insert_coach_override(user, blank).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
}

#[test]
fn test_database_type_detection() {
    assert_eq!(DatabaseType::detect("memory").unwrap(), DatabaseType::Memory);
    assert_eq!(DatabaseType::detect(" MEMORY ").unwrap(), DatabaseType::Memory);
    assert_eq!(
        DatabaseType::detect("sqlite::memory:").unwrap(),
        DatabaseType::Sqlite
    );
    assert_eq!(
        DatabaseType::detect("sqlite:./tex.db").unwrap(),
        DatabaseType::Sqlite
    );
    let err = DatabaseType::detect("postgres://localhost/tex").unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);
}

#[tokio::test]
async fn test_connect_selects_backend() {
    let memory = connect("memory").await.unwrap();
    assert_eq!(memory.backend_name(), "memory");

    let sqlite = connect("sqlite::memory:").await.unwrap();
    assert_eq!(sqlite.backend_name(), "sqlite");
    sqlite.insert_quiz(Uuid::new_v4(), night(2)).await.unwrap();

    assert!(connect("mysql://nope").await.is_err());
}

#[tokio::test]
async fn test_sqlite_file_persists_between_connections() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("tex.db").display());
    let user = Uuid::new_v4();
    {
        let repo = connect(&url).await.unwrap();
        repo.insert_quiz(user, pre_lift(12)).await.unwrap();
    }
    let repo = connect(&url).await.unwrap();
    let rows = repo.list_quizzes(user, QuizFilter::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].payload.notes.as_deref(), Some("tight hamstrings"));
}
