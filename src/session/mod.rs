// ABOUTME: Drill session orchestration: phase machine, fatigue, progress collaborators, seen drills
// ABOUTME: One DrillSession drives one drill from instructions through conclusion or exit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! # Drill sessions
//!
//! A [`DrillSession`] owns the lifecycle of a single drill attempt. Events
//! arrive through [`DrillSession::handle`]; every call returns a
//! [`SessionSnapshot`] describing what the client should render next.
//!
//! Scoring talks to three async collaborators: [`AdaptiveDifficulty`],
//! [`PersonalBestStore`] and [`SeenDrillsStore`]. Failures from any of them
//! are logged and never block the result.

/// Progress collaborators and their in-memory implementations
pub mod collaborators;

/// Per-session fatigue accumulation
pub mod fatigue;

/// Session state machine
pub mod orchestrator;

/// Phases and events
pub mod phase;

/// Post-drill reflection questions
pub mod reflection;

/// Persistence of drills the athlete has already played
pub mod seen_drills;

pub use collaborators::{
    AdaptiveDifficulty, InMemoryDifficulty, InMemoryPersonalBests, PersonalBestStore,
};
pub use fatigue::FatigueModel;
pub use orchestrator::{
    CompletionCallback, DrillSession, SessionCollaborators, SessionHandle, SessionOutcome,
    SessionSnapshot,
};
pub use phase::{Phase, SessionEvent};
pub use reflection::{reflection_questions, ReflectionAnswers, ReflectionQuestion};
pub use seen_drills::{InMemorySeenDrills, JsonFileSeenDrills, SeenDrillsStore};
