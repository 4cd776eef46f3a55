// ABOUTME: Integration tests for the drill session state machine
// ABOUTME: Covers phase transitions, countdown, fatigue, reflection, breaks and the Done callback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tex_vision::config::SessionConfig;
use tex_vision::drills::DrillInput;
use tex_vision::session::{
    DrillSession, InMemoryDifficulty, InMemoryPersonalBests, InMemorySeenDrills, Phase,
    SeenDrillsStore, SessionCollaborators, SessionEvent, SessionHandle, SessionOutcome,
};
use tex_vision_core::errors::ErrorCode;
use tex_vision_core::models::{DrillId, Tier};

fn collaborators() -> SessionCollaborators {
    SessionCollaborators {
        difficulty: Arc::new(InMemoryDifficulty::new()),
        personal_bests: Arc::new(InMemoryPersonalBests::new()),
        seen_drills: Arc::new(InMemorySeenDrills::new()),
    }
}

fn session(drill: DrillId) -> DrillSession {
    DrillSession::new(
        drill,
        Tier::Beginner,
        99,
        SessionConfig::default(),
        collaborators(),
    )
}

fn tick(dt_ms: u64) -> SessionEvent {
    SessionEvent::Tick { dt_ms }
}

/// Instructions -> countdown -> playing -> expired drill
async fn play_once(session: &mut DrillSession) {
    session.handle(SessionEvent::Start).await.unwrap();
    session.handle(tick(3000)).await.unwrap();
    assert_eq!(session.phase(), Phase::Playing);
    session.handle(SessionEvent::DurationElapsed).await.unwrap();
}

#[tokio::test]
async fn test_countdown_rounds_partial_seconds_up() {
    let mut s = session(DrillId::ReactionTap);
    assert_eq!(s.phase(), Phase::Instructions);

    let snap = s.handle(SessionEvent::Start).await.unwrap();
    assert_eq!(snap.phase, Phase::Countdown);
    assert_eq!(snap.countdown_remaining, Some(3));

    let snap = s.handle(tick(1500)).await.unwrap();
    assert_eq!(snap.countdown_remaining, Some(2));

    let snap = s.handle(tick(1499)).await.unwrap();
    assert_eq!(snap.countdown_remaining, Some(1));

    let snap = s.handle(tick(1)).await.unwrap();
    assert_eq!(snap.phase, Phase::Playing);
    assert_eq!(snap.countdown_remaining, None);
    assert_eq!(snap.difficulty_level, 5);
    assert!(snap.drill_view.is_some());
}

#[tokio::test]
async fn test_ticks_ignored_in_passive_phases() {
    let mut s = session(DrillId::ReactionTap);
    let snap = s.handle(tick(60_000)).await.unwrap();
    assert_eq!(snap.phase, Phase::Instructions);
}

#[tokio::test]
async fn test_rejected_events_keep_phase() {
    let mut s = session(DrillId::ReactionTap);
    let err = s.handle(SessionEvent::Done).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);

    let err = s
        .handle(SessionEvent::Input {
            input: DrillInput::Tap,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);
    assert_eq!(s.phase(), Phase::Instructions);
}

#[tokio::test]
async fn test_tutorial_skip_requires_seen_drill() {
    let seen = Arc::new(InMemorySeenDrills::new());
    let collab = SessionCollaborators {
        seen_drills: seen.clone(),
        ..collaborators()
    };
    let mut first = DrillSession::new(
        DrillId::ReactionTap,
        Tier::Beginner,
        1,
        SessionConfig::default(),
        collab.clone(),
    );
    let err = first.handle(SessionEvent::SkipTutorial).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidState);

    play_once(&mut first).await;
    assert!(seen.has_seen(DrillId::ReactionTap).await.unwrap());

    let mut second = DrillSession::new(
        DrillId::ReactionTap,
        Tier::Beginner,
        2,
        SessionConfig::default(),
        collab,
    );
    let snap = second.handle(SessionEvent::SkipTutorial).await.unwrap();
    assert_eq!(snap.phase, Phase::Countdown);
}

#[tokio::test]
async fn test_completion_scores_and_applies_fatigue() {
    let mut s = session(DrillId::ReactionTap);
    play_once(&mut s).await;

    // No reflection questions: straight to the conclusion
    assert_eq!(s.phase(), Phase::Conclusion);
    let snap = s.snapshot();
    let result = snap.result.expect("result after completion");
    assert_eq!(result.drill_type, DrillId::ReactionTap);
    assert_eq!(result.tier, Tier::Beginner);
    assert_eq!(result.accuracy_percent, Some(0.0));
    assert_eq!(result.difficulty_level, Some(5));
    // Base 8 plus the low-accuracy penalty of 5
    assert!((snap.fatigue - 13.0).abs() < f64::EPSILON);
    assert_eq!(result.fatigue_score, Some(snap.fatigue));
    assert_eq!(snap.completed_drills, 1);
    assert!(!snap.break_recommended);
    assert!(snap.drill_view.is_none());
}

#[tokio::test]
async fn test_retry_reseeds_and_accumulates() {
    let mut s = session(DrillId::ReactionTap);
    play_once(&mut s).await;
    let snap = s.handle(SessionEvent::Retry).await.unwrap();
    assert_eq!(snap.phase, Phase::Countdown);
    assert!(snap.result.is_some(), "result kept until the next attempt starts");

    s.handle(tick(3000)).await.unwrap();
    assert!(s.result().is_none());
    s.handle(SessionEvent::DurationElapsed).await.unwrap();
    assert_eq!(s.snapshot().completed_drills, 2);
    assert!((s.fatigue() - 26.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_break_recommended_after_heavy_session() {
    let mut s = session(DrillId::ReactionTap);
    play_once(&mut s).await;
    for _ in 0..5 {
        s.handle(SessionEvent::Retry).await.unwrap();
        s.handle(tick(3000)).await.unwrap();
        s.handle(SessionEvent::DurationElapsed).await.unwrap();
    }
    // 13 + 13 + 13 + 15 + 15 + 15
    assert!((s.fatigue() - 84.0).abs() < f64::EPSILON);
    assert!(s.snapshot().break_recommended);
}

#[tokio::test]
async fn test_break_decays_fatigue_then_counts_down() {
    let mut s = session(DrillId::ReactionTap);
    play_once(&mut s).await;

    let snap = s.handle(SessionEvent::TakeBreak).await.unwrap();
    assert_eq!(snap.phase, Phase::Break);
    assert_eq!(snap.break_remaining_ms, Some(30_000));

    let snap = s.handle(tick(10_000)).await.unwrap();
    assert!((snap.fatigue - 8.0).abs() < f64::EPSILON);
    assert_eq!(snap.break_remaining_ms, Some(20_000));

    let snap = s.handle(tick(60_000)).await.unwrap();
    assert_eq!(snap.phase, Phase::Countdown);
    assert!(snap.fatigue.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_skip_break_starts_countdown() {
    let mut s = session(DrillId::ReactionTap);
    play_once(&mut s).await;
    s.handle(SessionEvent::TakeBreak).await.unwrap();
    let snap = s.handle(SessionEvent::SkipBreak).await.unwrap();
    assert_eq!(snap.phase, Phase::Countdown);
    assert!((snap.fatigue - 13.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_reflection_answers_are_validated() {
    let mut s = session(DrillId::ColorFlash);
    play_once(&mut s).await;
    let snap = s.snapshot();
    assert_eq!(snap.phase, Phase::Reflection);
    assert_eq!(snap.reflection_questions.len(), 2);

    let bad = BTreeMap::from([("feel".to_owned(), "terrible".to_owned())]);
    let err = s
        .handle(SessionEvent::SubmitReflection { answers: bad })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(s.phase(), Phase::Reflection);

    let good = BTreeMap::from([
        ("feel".to_owned(), "hard".to_owned()),
        ("strategy".to_owned(), "watching the centre".to_owned()),
        ("unrelated".to_owned(), "dropped".to_owned()),
    ]);
    let snap = s
        .handle(SessionEvent::SubmitReflection { answers: good })
        .await
        .unwrap();
    assert_eq!(snap.phase, Phase::Conclusion);
}

#[tokio::test]
async fn test_done_invokes_callback_once() {
    let outcomes: Arc<Mutex<Vec<SessionOutcome>>> = Arc::default();
    let sink = Arc::clone(&outcomes);
    let mut s = session(DrillId::ColorFlash).with_completion_callback(Box::new(move |o| {
        sink.lock().unwrap().push(o);
    }));

    play_once(&mut s).await;
    let answers = BTreeMap::from([("feel".to_owned(), "easy".to_owned())]);
    s.handle(SessionEvent::SubmitReflection { answers })
        .await
        .unwrap();
    let snap = s.handle(SessionEvent::Done).await.unwrap();
    assert_eq!(snap.phase, Phase::Finished);

    // Only Exit is accepted once finished
    assert!(s.handle(SessionEvent::Done).await.is_err());
    assert!(s.handle(SessionEvent::Exit).await.is_ok());

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.result.drill_type, DrillId::ColorFlash);
    assert_eq!(outcome.completed_drills, 1);
    assert_eq!(outcome.reflection.0.get("feel").map(String::as_str), Some("easy"));
    assert!(!outcome.personal_best.is_new_accuracy_record);
}

#[tokio::test]
async fn test_exit_never_invokes_callback() {
    let calls = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&calls);
    let mut s = session(DrillId::ReactionTap).with_completion_callback(Box::new(move |_| {
        *counter.lock().unwrap() += 1;
    }));

    play_once(&mut s).await;
    let snap = s.handle(SessionEvent::Exit).await.unwrap();
    assert_eq!(snap.phase, Phase::Finished);
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_drill_accepts_only_exit() {
    let mut handle = SessionHandle::open(
        "laser-tag",
        Tier::Beginner,
        1,
        SessionConfig::default(),
        collaborators(),
    );
    assert!(matches!(handle, SessionHandle::NotFound { .. }));

    let err = handle.handle(SessionEvent::Start).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert!(handle.handle(SessionEvent::Exit).await.unwrap().is_none());
}

#[tokio::test]
async fn test_known_drill_opens_active_handle() {
    let mut handle = SessionHandle::open(
        "go-no-go",
        Tier::Elite,
        1,
        SessionConfig::default(),
        collaborators(),
    );
    let snap = handle
        .handle(SessionEvent::Start)
        .await
        .unwrap()
        .expect("active session returns a snapshot");
    assert_eq!(snap.drill, DrillId::GoNoGo);
    assert_eq!(snap.tier, Tier::Elite);
    assert_eq!(snap.phase, Phase::Countdown);
}

#[tokio::test]
async fn test_custom_countdown_length() {
    let config = SessionConfig {
        countdown_secs: 1,
        ..SessionConfig::default()
    };
    let mut s = DrillSession::new(DrillId::ReactionTap, Tier::Beginner, 1, config, collaborators());
    s.handle(SessionEvent::Start).await.unwrap();
    let snap = s.handle(tick(1000)).await.unwrap();
    assert_eq!(snap.phase, Phase::Playing);
}
