// ABOUTME: DrillSession state machine from instructions through play, reflection, conclusion and breaks
// ABOUTME: Scores completed drills through async collaborators whose failures never block the result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::collaborators::{AdaptiveDifficulty, PersonalBestStore};
use super::fatigue::FatigueModel;
use super::phase::{Phase, SessionEvent};
use super::reflection::{reflection_questions, ReflectionAnswers, ReflectionQuestion};
use super::seen_drills::SeenDrillsStore;
use crate::config::SessionConfig;
use crate::drills::{build_drill, millis, Drill, DrillConfig, DrillInput, DrillView};
use crate::logging::AppLogger;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tex_vision_core::constants::{celebration, difficulty};
use tex_vision_core::errors::{AppError, AppResult};
use tex_vision_core::models::{
    Celebration, DrillId, DrillOutcome, DrillResult, PersonalBestAttempt, PersonalBestCheck, Tier,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Called once with the final outcome when the athlete presses Done
pub type CompletionCallback = Box<dyn FnOnce(SessionOutcome) + Send + Sync>;

/// Services a session consults when a drill completes
#[derive(Clone)]
pub struct SessionCollaborators {
    /// Adaptive difficulty per drill
    pub difficulty: Arc<dyn AdaptiveDifficulty>,
    /// Personal bests per drill and tier
    pub personal_bests: Arc<dyn PersonalBestStore>,
    /// Drills already played
    pub seen_drills: Arc<dyn SeenDrillsStore>,
}

/// What the caller receives when a session ends with Done
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    /// The last attempt's result
    pub result: DrillResult,
    /// Celebration shown with it
    pub celebration: Option<Celebration>,
    /// Personal-best comparison
    pub personal_best: PersonalBestCheck,
    /// Reflection answers, possibly empty
    pub reflection: ReflectionAnswers,
    /// Attempts completed in this session
    pub completed_drills: u32,
}

/// Render state returned after every event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session identifier
    pub session_id: Uuid,
    /// Drill being played
    pub drill: DrillId,
    /// Tier
    pub tier: Tier,
    /// Current phase
    pub phase: Phase,
    /// Whole seconds left on the countdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_remaining: Option<u32>,
    /// Milliseconds left on the break
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_remaining_ms: Option<u64>,
    /// Session fatigue
    pub fatigue: f64,
    /// Conclusion screen suggests a break
    pub break_recommended: bool,
    /// Difficulty the current attempt runs at
    pub difficulty_level: u8,
    /// Drill state while playing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drill_view: Option<DrillView>,
    /// Latest result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DrillResult>,
    /// Latest celebration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub celebration: Option<Celebration>,
    /// Latest personal-best comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_best: Option<PersonalBestCheck>,
    /// Questions to ask in the reflection phase
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reflection_questions: Vec<ReflectionQuestion>,
    /// Attempts completed in this session
    pub completed_drills: u32,
}

/// Result of opening a session for a drill id
pub enum SessionHandle {
    /// A playable session
    Active(Box<DrillSession>),
    /// The id matched no drill; only Exit is accepted
    NotFound {
        /// Id the caller asked for
        requested: String,
    },
}

impl SessionHandle {
    /// Resolve `drill` and open a session, or a not-found handle
    pub fn open(
        drill: &str,
        tier: Tier,
        seed: u64,
        config: SessionConfig,
        collaborators: SessionCollaborators,
    ) -> Self {
        match drill.parse::<DrillId>() {
            Ok(id) => Self::Active(Box::new(DrillSession::new(
                id,
                tier,
                seed,
                config,
                collaborators,
            ))),
            Err(_) => {
                warn!(drill = %drill, "Session requested for unknown drill");
                Self::NotFound {
                    requested: drill.to_owned(),
                }
            }
        }
    }

    /// Register the Done callback on an active session
    #[must_use]
    pub fn with_completion_callback(self, callback: CompletionCallback) -> Self {
        match self {
            Self::Active(session) => {
                Self::Active(Box::new((*session).with_completion_callback(callback)))
            }
            not_found @ Self::NotFound { .. } => not_found,
        }
    }

    /// Forward an event; a not-found handle accepts only Exit and returns no snapshot
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for any event but Exit on a not-found handle,
    /// otherwise whatever [`DrillSession::handle`] returns
    pub async fn handle(&mut self, event: SessionEvent) -> AppResult<Option<SessionSnapshot>> {
        match self {
            Self::Active(session) => session.handle(event).await.map(Some),
            Self::NotFound { .. } if event == SessionEvent::Exit => Ok(None),
            Self::NotFound { requested } => {
                Err(AppError::not_found(format!("Drill '{requested}'")))
            }
        }
    }
}

/// One athlete playing one drill, possibly several times
pub struct DrillSession {
    id: Uuid,
    drill_id: DrillId,
    tier: Tier,
    seed: u64,
    config: SessionConfig,
    collaborators: SessionCollaborators,
    phase: Phase,
    countdown_elapsed: Duration,
    break_elapsed: Duration,
    drill: Option<Box<dyn Drill>>,
    drill_clock: Duration,
    attempts_started: u32,
    difficulty_level: u8,
    fatigue: FatigueModel,
    completed: u32,
    result: Option<DrillResult>,
    celebration: Option<Celebration>,
    personal_best: Option<PersonalBestCheck>,
    reflection: ReflectionAnswers,
    on_complete: Option<CompletionCallback>,
}

impl DrillSession {
    /// New session in the instructions phase
    #[must_use]
    pub fn new(
        drill_id: DrillId,
        tier: Tier,
        seed: u64,
        config: SessionConfig,
        collaborators: SessionCollaborators,
    ) -> Self {
        let fatigue = FatigueModel::from_config(&config);
        Self {
            id: Uuid::new_v4(),
            drill_id,
            tier,
            seed,
            config,
            collaborators,
            phase: Phase::Instructions,
            countdown_elapsed: Duration::ZERO,
            break_elapsed: Duration::ZERO,
            drill: None,
            drill_clock: Duration::ZERO,
            attempts_started: 0,
            difficulty_level: difficulty::DEFAULT_LEVEL,
            fatigue,
            completed: 0,
            result: None,
            celebration: None,
            personal_best: None,
            reflection: ReflectionAnswers::default(),
            on_complete: None,
        }
    }

    /// Register the Done callback
    #[must_use]
    pub fn with_completion_callback(mut self, callback: CompletionCallback) -> Self {
        self.on_complete = Some(callback);
        self
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Drill being played
    #[must_use]
    pub const fn drill_id(&self) -> DrillId {
        self.drill_id
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current fatigue
    #[must_use]
    pub const fn fatigue(&self) -> f64 {
        self.fatigue.score()
    }

    /// Latest result
    #[must_use]
    pub const fn result(&self) -> Option<&DrillResult> {
        self.result.as_ref()
    }

    /// Apply one event
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the event is not accepted in the current
    /// phase, or `InvalidInput` for reflection answers outside a question's options
    pub async fn handle(&mut self, event: SessionEvent) -> AppResult<SessionSnapshot> {
        debug!(session.id = %self.id, phase = %self.phase, event = event.name(), "Session event");

        match (self.phase, event) {
            (Phase::Finished, SessionEvent::Exit) => {}
            (Phase::Finished, event) => return Err(self.rejected(&event)),
            (_, SessionEvent::Exit) => self.exit(),
            (_, SessionEvent::Tick { dt_ms }) => {
                self.tick(Duration::from_millis(dt_ms)).await;
            }

            (Phase::Instructions, SessionEvent::Start) => self.enter_countdown(),
            (Phase::Instructions, SessionEvent::SkipTutorial) => {
                if !self.has_seen_drill().await {
                    return Err(AppError::invalid_state(format!(
                        "Tutorial for '{}' cannot be skipped before the drill has been played",
                        self.drill_id
                    )));
                }
                self.enter_countdown();
            }

            (Phase::Playing, SessionEvent::Input { input }) => self.forward_input(input).await,
            (Phase::Playing, SessionEvent::DurationElapsed) => {
                let outcome = self.drill.as_mut().and_then(|d| d.expire());
                if let Some(outcome) = outcome {
                    self.complete(outcome).await;
                }
            }

            (Phase::Reflection, SessionEvent::SubmitReflection { answers }) => {
                self.reflection = ReflectionAnswers::validated(self.drill_id, answers)?;
                self.phase = Phase::Conclusion;
            }
            (Phase::Reflection, SessionEvent::SkipReflection) => {
                self.reflection = ReflectionAnswers::default();
                self.phase = Phase::Conclusion;
            }

            (Phase::Conclusion, SessionEvent::Done) => self.finish(),
            (Phase::Conclusion, SessionEvent::Retry) => self.enter_countdown(),
            (Phase::Conclusion, SessionEvent::TakeBreak) => {
                self.break_elapsed = Duration::ZERO;
                self.phase = Phase::Break;
            }

            (Phase::Break, SessionEvent::SkipBreak) => self.enter_countdown(),

            (_, event) => return Err(self.rejected(&event)),
        }

        Ok(self.snapshot())
    }

    fn rejected(&self, event: &SessionEvent) -> AppError {
        AppError::invalid_state(format!(
            "Event '{}' is not accepted in phase '{}'",
            event.name(),
            self.phase
        ))
    }

    async fn has_seen_drill(&self) -> bool {
        match self.collaborators.seen_drills.has_seen(self.drill_id).await {
            Ok(seen) => seen,
            Err(e) => {
                warn!(session.id = %self.id, error = %e, "Seen-drills lookup failed");
                false
            }
        }
    }

    fn enter_countdown(&mut self) {
        self.drill = None;
        self.drill_clock = Duration::ZERO;
        self.countdown_elapsed = Duration::ZERO;
        self.phase = Phase::Countdown;
    }

    async fn tick(&mut self, dt: Duration) {
        match self.phase {
            Phase::Countdown => {
                self.countdown_elapsed += dt;
                if self.countdown_elapsed >= self.countdown_length() {
                    self.start_drill().await;
                }
            }
            Phase::Playing => {
                self.drill_clock += dt;
                let now = self.drill_clock;
                let outcome = self.drill.as_mut().and_then(|d| d.advance(now));
                if let Some(outcome) = outcome {
                    self.complete(outcome).await;
                }
            }
            Phase::Break => {
                let remaining = self.break_length().saturating_sub(self.break_elapsed);
                self.fatigue.decay(dt.min(remaining));
                self.break_elapsed += dt;
                if self.break_elapsed >= self.break_length() {
                    self.enter_countdown();
                }
            }
            Phase::Instructions | Phase::Reflection | Phase::Conclusion | Phase::Finished => {}
        }
    }

    fn countdown_length(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.countdown_secs))
    }

    fn break_length(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.break_secs))
    }

    async fn start_drill(&mut self) {
        self.difficulty_level = match self
            .collaborators
            .difficulty
            .current_difficulty(self.drill_id)
            .await
        {
            Ok(level) => level.clamp(difficulty::MIN_LEVEL, difficulty::MAX_LEVEL),
            Err(e) => {
                warn!(session.id = %self.id, error = %e, "Difficulty lookup failed, using default");
                difficulty::DEFAULT_LEVEL
            }
        };
        let config = DrillConfig::new(
            self.tier,
            self.seed.wrapping_add(u64::from(self.attempts_started)),
        )
        .with_difficulty(self.difficulty_level);
        self.attempts_started += 1;
        self.drill = Some(build_drill(self.drill_id, config));
        self.drill_clock = Duration::ZERO;
        self.result = None;
        self.celebration = None;
        self.personal_best = None;
        self.reflection = ReflectionAnswers::default();
        self.phase = Phase::Playing;
    }

    async fn forward_input(&mut self, input: DrillInput) {
        let now = self.drill_clock;
        let outcome = self.drill.as_mut().and_then(|d| d.input(now, input));
        if let Some(outcome) = outcome {
            self.complete(outcome).await;
        }
    }

    async fn complete(&mut self, outcome: DrillOutcome) {
        let completed_before = self.completed;
        self.fatigue
            .record_completion(outcome.accuracy_percent, completed_before);
        self.completed += 1;

        if let Err(e) = self
            .collaborators
            .difficulty
            .update_difficulty(
                self.drill_id,
                outcome.accuracy_percent,
                outcome.reaction_time_ms,
            )
            .await
        {
            warn!(session.id = %self.id, error = %e, "Difficulty update failed");
        }

        let attempt = PersonalBestAttempt {
            accuracy: outcome.accuracy_percent.unwrap_or(0.0),
            reaction_time_ms: outcome.reaction_time_ms,
            streak: outcome.streak(),
        };
        let check = match self
            .collaborators
            .personal_bests
            .check_and_update(self.drill_id, self.tier, attempt)
            .await
        {
            Ok(check) => check,
            Err(e) => {
                warn!(session.id = %self.id, error = %e, "Personal best check failed");
                PersonalBestCheck::default()
            }
        };

        let interactions = outcome.interactions();
        let result = DrillResult::from_outcome(self.drill_id, self.tier, outcome)
            .with_difficulty(self.difficulty_level)
            .with_fatigue(self.fatigue.score());
        self.celebration = choose_celebration(result.accuracy_percent, &check);

        if let Err(e) = self.collaborators.seen_drills.mark_seen(self.drill_id).await {
            warn!(session.id = %self.id, error = %e, "Failed to record drill as seen");
        }

        let active_ms = millis(self.drill_clock);
        if interactions < self.config.min_interactions || active_ms < self.config.min_active_ms {
            AppLogger::log_suspicious_completion(
                &self.id.to_string(),
                self.drill_id.as_str(),
                interactions,
                active_ms,
            );
        }
        AppLogger::log_drill_completion(
            &self.id.to_string(),
            self.drill_id.as_str(),
            self.tier.as_str(),
            result.accuracy_percent,
            result.reaction_time_ms,
            self.fatigue.score(),
        );

        self.result = Some(result);
        self.personal_best = Some(check);
        self.drill = None;
        self.phase = if reflection_questions(self.drill_id).is_empty() {
            Phase::Conclusion
        } else {
            Phase::Reflection
        };
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        let (Some(callback), Some(result)) = (self.on_complete.take(), self.result.clone()) else {
            return;
        };
        info!(session.id = %self.id, drill = %self.drill_id, "Session finished");
        callback(SessionOutcome {
            result,
            celebration: self.celebration,
            personal_best: self.personal_best.clone().unwrap_or_default(),
            reflection: self.reflection.clone(),
            completed_drills: self.completed,
        });
    }

    fn exit(&mut self) {
        info!(session.id = %self.id, phase = %self.phase, "Session exited");
        self.drill = None;
        self.on_complete = None;
        self.phase = Phase::Finished;
    }

    /// Current render state
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let countdown_remaining = (self.phase == Phase::Countdown).then(|| {
            let left = self.countdown_length().saturating_sub(self.countdown_elapsed);
            // 3-2-1: partial seconds round up
            u32::try_from(left.as_millis().div_ceil(1000)).unwrap_or(u32::MAX)
        });
        let break_remaining_ms = (self.phase == Phase::Break)
            .then(|| millis(self.break_length().saturating_sub(self.break_elapsed)));
        let reflection_questions = if self.phase == Phase::Reflection {
            reflection_questions(self.drill_id).to_vec()
        } else {
            Vec::new()
        };

        SessionSnapshot {
            session_id: self.id,
            drill: self.drill_id,
            tier: self.tier,
            phase: self.phase,
            countdown_remaining,
            break_remaining_ms,
            fatigue: self.fatigue.score(),
            break_recommended: self.phase == Phase::Conclusion
                && self.fatigue.score() >= self.config.break_recommended_at,
            difficulty_level: self.difficulty_level,
            drill_view: self.drill.as_ref().map(|d| d.view()),
            result: self.result.clone(),
            celebration: self.celebration,
            personal_best: self.personal_best.clone(),
            reflection_questions,
            completed_drills: self.completed,
        }
    }
}

/// Perfect beats a new personal best, which beats excellent
fn choose_celebration(accuracy: Option<f64>, check: &PersonalBestCheck) -> Option<Celebration> {
    let accuracy = accuracy.unwrap_or(0.0);
    if accuracy >= celebration::PERFECT_ACCURACY {
        Some(Celebration::Perfect)
    } else if check.beat_headline_record() {
        Some(Celebration::NewPersonalBest)
    } else if accuracy >= celebration::EXCELLENT_ACCURACY {
        Some(Celebration::Excellent)
    } else {
        None
    }
}
