// ABOUTME: In-memory WellnessRepository backed by tokio RwLocks
// ABOUTME: Used for tests and the "memory" database URL; contents vanish with the process
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::{keep_most_recent, QuizFilter, WellnessRepository};
use async_trait::async_trait;
use chrono::Utc;
use tex_vision_core::errors::AppResult;
use tex_vision_core::models::{
    CoachOverride, NewCoachOverride, NewWeightEntry, WeightEntry, WellnessQuizPayload,
    WellnessQuizRecord,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Volatile repository
#[derive(Debug, Default)]
pub struct MemoryRepository {
    quizzes: RwLock<Vec<WellnessQuizRecord>>,
    weights: RwLock<Vec<WeightEntry>>,
    overrides: RwLock<Vec<CoachOverride>>,
}

impl MemoryRepository {
    /// Empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WellnessRepository for MemoryRepository {
    async fn migrate(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_quiz(
        &self,
        user_id: Uuid,
        payload: WellnessQuizPayload,
    ) -> AppResult<WellnessQuizRecord> {
        payload.validate()?;
        let record = WellnessQuizRecord {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            payload,
        };
        self.quizzes.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_quizzes(
        &self,
        user_id: Uuid,
        filter: QuizFilter,
    ) -> AppResult<Vec<WellnessQuizRecord>> {
        let mut rows: Vec<WellnessQuizRecord> = self
            .quizzes
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| filter.quiz_type.is_none_or(|t| r.payload.quiz_type == t))
            .filter(|r| filter.since.is_none_or(|d| r.payload.entry_date >= d))
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.payload.entry_date, r.created_at));
        Ok(keep_most_recent(rows, filter.limit))
    }

    async fn insert_weight(&self, user_id: Uuid, entry: NewWeightEntry) -> AppResult<WeightEntry> {
        entry.validate()?;
        let row = WeightEntry {
            id: Uuid::new_v4(),
            user_id,
            entry_date: entry.entry_date,
            weight_lbs: entry.weight_lbs,
            created_at: Utc::now(),
        };
        self.weights.write().await.push(row.clone());
        Ok(row)
    }

    async fn list_weights(&self, user_id: Uuid) -> AppResult<Vec<WeightEntry>> {
        let mut rows: Vec<WeightEntry> = self
            .weights
            .read()
            .await
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|w| (w.entry_date, w.created_at));
        Ok(rows)
    }

    async fn insert_coach_override(
        &self,
        user_id: Uuid,
        entry: NewCoachOverride,
    ) -> AppResult<CoachOverride> {
        entry.validate()?;
        let row = CoachOverride {
            id: Uuid::new_v4(),
            user_id,
            session_id: entry.session_id,
            coach_id: entry.coach_id,
            original_grade: entry.original_grade,
            override_grade: entry.override_grade,
            override_reason: entry.override_reason,
            created_at: Utc::now(),
        };
        self.overrides.write().await.push(row.clone());
        Ok(row)
    }

    async fn list_coach_overrides(&self, user_id: Uuid) -> AppResult<Vec<CoachOverride>> {
        Ok(self
            .overrides
            .read()
            .await
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
