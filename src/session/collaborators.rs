// ABOUTME: Adaptive difficulty and personal-best collaborators used when a drill completes
// ABOUTME: Async traits with in-memory implementations guarded by tokio RwLocks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tex_vision_core::constants::difficulty;
use tex_vision_core::errors::AppResult;
use tex_vision_core::models::{
    DifficultyAdjustment, DrillId, PersonalBest, PersonalBestAttempt, PersonalBestCheck, Tier,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Per-drill difficulty level that follows recent performance
#[async_trait]
pub trait AdaptiveDifficulty: Send + Sync {
    /// Level (1-10) the next attempt should run at
    async fn current_difficulty(&self, drill: DrillId) -> AppResult<u8>;

    /// What the recent attempts suggest
    async fn recommended_adjustment(&self, drill: DrillId) -> AppResult<DifficultyAdjustment>;

    /// Record an attempt and apply the resulting adjustment
    async fn update_difficulty(
        &self,
        drill: DrillId,
        accuracy: Option<f64>,
        reaction_time_ms: Option<f64>,
    ) -> AppResult<()>;
}

/// Best results per drill and tier
#[async_trait]
pub trait PersonalBestStore: Send + Sync {
    /// Stored record, `None` before the first attempt
    async fn personal_best(&self, drill: DrillId, tier: Tier) -> AppResult<Option<PersonalBest>>;

    /// Compare an attempt with the record and store any improvement
    async fn check_and_update(
        &self,
        drill: DrillId,
        tier: Tier,
        attempt: PersonalBestAttempt,
    ) -> AppResult<PersonalBestCheck>;
}

#[derive(Debug, Clone, Copy)]
struct AttemptSample {
    accuracy: Option<f64>,
    reaction_time_ms: Option<f64>,
}

#[derive(Debug, Default)]
struct DifficultyTrack {
    level: Option<u8>,
    recent: VecDeque<AttemptSample>,
}

/// In-memory adaptive difficulty over a sliding window of attempts
#[derive(Debug, Default)]
pub struct InMemoryDifficulty {
    tracks: RwLock<HashMap<DrillId, DifficultyTrack>>,
}

impl InMemoryDifficulty {
    /// Empty store, every drill at the default level
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn recommend(recent: &VecDeque<AttemptSample>) -> DifficultyAdjustment {
        let accuracies: Vec<f64> = recent.iter().filter_map(|s| s.accuracy).collect();
        if accuracies.is_empty() {
            return DifficultyAdjustment::Stable;
        }
        let mean_accuracy = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
        let reactions: Vec<f64> = recent.iter().filter_map(|s| s.reaction_time_ms).collect();
        let fast_enough = reactions.is_empty()
            || reactions.iter().sum::<f64>() / reactions.len() as f64
                <= difficulty::INCREASE_MAX_REACTION_MS;

        if mean_accuracy >= difficulty::INCREASE_ACCURACY && fast_enough {
            DifficultyAdjustment::Increase
        } else if mean_accuracy < difficulty::DECREASE_ACCURACY {
            DifficultyAdjustment::Decrease
        } else {
            DifficultyAdjustment::Stable
        }
    }
}

#[async_trait]
impl AdaptiveDifficulty for InMemoryDifficulty {
    async fn current_difficulty(&self, drill: DrillId) -> AppResult<u8> {
        let tracks = self.tracks.read().await;
        Ok(tracks
            .get(&drill)
            .and_then(|t| t.level)
            .unwrap_or(difficulty::DEFAULT_LEVEL))
    }

    async fn recommended_adjustment(&self, drill: DrillId) -> AppResult<DifficultyAdjustment> {
        let tracks = self.tracks.read().await;
        Ok(tracks
            .get(&drill)
            .map_or(DifficultyAdjustment::Stable, |t| Self::recommend(&t.recent)))
    }

    async fn update_difficulty(
        &self,
        drill: DrillId,
        accuracy: Option<f64>,
        reaction_time_ms: Option<f64>,
    ) -> AppResult<()> {
        let mut tracks = self.tracks.write().await;
        let track = tracks.entry(drill).or_default();
        track.recent.push_back(AttemptSample {
            accuracy,
            reaction_time_ms,
        });
        while track.recent.len() > difficulty::HISTORY_WINDOW {
            track.recent.pop_front();
        }

        let current = track.level.unwrap_or(difficulty::DEFAULT_LEVEL);
        let adjustment = Self::recommend(&track.recent);
        let next = match adjustment {
            DifficultyAdjustment::Increase => current.saturating_add(1),
            DifficultyAdjustment::Decrease => current.saturating_sub(1),
            DifficultyAdjustment::Stable => current,
        }
        .clamp(difficulty::MIN_LEVEL, difficulty::MAX_LEVEL);
        track.level = Some(next);

        debug!(drill = %drill, ?adjustment, from = current, to = next, "Difficulty updated");
        Ok(())
    }
}

/// In-memory personal bests keyed by drill and tier
#[derive(Debug, Default)]
pub struct InMemoryPersonalBests {
    records: RwLock<HashMap<(DrillId, Tier), PersonalBest>>,
}

impl InMemoryPersonalBests {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonalBestStore for InMemoryPersonalBests {
    async fn personal_best(&self, drill: DrillId, tier: Tier) -> AppResult<Option<PersonalBest>> {
        Ok(self.records.read().await.get(&(drill, tier)).cloned())
    }

    async fn check_and_update(
        &self,
        drill: DrillId,
        tier: Tier,
        attempt: PersonalBestAttempt,
    ) -> AppResult<PersonalBestCheck> {
        let mut records = self.records.write().await;
        let now = Utc::now();

        let Some(best) = records.get_mut(&(drill, tier)) else {
            records.insert(
                (drill, tier),
                PersonalBest {
                    best_accuracy: attempt.accuracy,
                    best_reaction_time_ms: attempt.reaction_time_ms,
                    best_streak: attempt.streak,
                    attempts: 1,
                    updated_at: now,
                },
            );
            return Ok(PersonalBestCheck::default());
        };

        let previous = best.clone();
        let is_new_accuracy_record = attempt.accuracy > previous.best_accuracy;
        let is_new_reaction_record = match (attempt.reaction_time_ms, previous.best_reaction_time_ms)
        {
            (Some(rt), Some(best_rt)) => rt < best_rt,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let is_new_streak_record = attempt.streak > previous.best_streak;

        best.attempts += 1;
        if is_new_accuracy_record {
            best.best_accuracy = attempt.accuracy;
        }
        if is_new_reaction_record {
            best.best_reaction_time_ms = attempt.reaction_time_ms;
        }
        if is_new_streak_record {
            best.best_streak = attempt.streak;
        }
        if is_new_accuracy_record || is_new_reaction_record || is_new_streak_record {
            best.updated_at = now;
        }

        Ok(PersonalBestCheck {
            is_new_accuracy_record,
            is_new_reaction_record,
            is_new_streak_record,
            previous_best: Some(previous),
        })
    }
}
