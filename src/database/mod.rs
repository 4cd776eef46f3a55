// ABOUTME: Persistence abstraction for wellness quizzes, weight logs and coach overrides
// ABOUTME: Runtime backend selection between SQLite and an in-memory store from the database URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! # Database
//!
//! Every row is scoped by user id. Backends implement [`WellnessRepository`];
//! [`connect`] picks one from a connection string.

/// In-memory backend
pub mod memory;

/// `SQLite` backend
pub mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tex_vision_core::errors::{AppError, AppResult};
use tex_vision_core::models::{
    CoachOverride, NewCoachOverride, NewWeightEntry, QuizType, WeightEntry, WellnessQuizPayload,
    WellnessQuizRecord,
};
use tracing::info;
use uuid::Uuid;

/// Which quiz rows to return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct QuizFilter {
    /// Only this quiz type
    pub quiz_type: Option<QuizType>,
    /// Only rows dated on or after this day
    pub since: Option<NaiveDate>,
    /// Keep only the most recent rows
    pub limit: Option<u32>,
}

impl QuizFilter {
    /// Rows dated on or after `since`
    #[must_use]
    pub const fn since(since: NaiveDate) -> Self {
        Self {
            quiz_type: None,
            since: Some(since),
            limit: None,
        }
    }
}

/// Storage for everything an athlete logs outside drills
#[async_trait]
pub trait WellnessRepository: Send + Sync {
    /// Create tables if missing
    async fn migrate(&self) -> AppResult<()>;

    /// Store a quiz submission
    async fn insert_quiz(
        &self,
        user_id: Uuid,
        payload: WellnessQuizPayload,
    ) -> AppResult<WellnessQuizRecord>;

    /// Quiz rows for a user sorted by entry date ascending
    async fn list_quizzes(
        &self,
        user_id: Uuid,
        filter: QuizFilter,
    ) -> AppResult<Vec<WellnessQuizRecord>>;

    /// Store a body-weight entry
    async fn insert_weight(&self, user_id: Uuid, entry: NewWeightEntry) -> AppResult<WeightEntry>;

    /// Weight entries sorted by date ascending
    async fn list_weights(&self, user_id: Uuid) -> AppResult<Vec<WeightEntry>>;

    /// Store a coach grade override
    async fn insert_coach_override(
        &self,
        user_id: Uuid,
        entry: NewCoachOverride,
    ) -> AppResult<CoachOverride>;

    /// Coach overrides, oldest first
    async fn list_coach_overrides(&self, user_id: Uuid) -> AppResult<Vec<CoachOverride>>;

    /// Human-readable backend name
    fn backend_name(&self) -> &'static str;
}

/// Supported backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// `sqlite:` URLs
    Sqlite,
    /// `memory`
    Memory,
}

impl DatabaseType {
    /// Detect the backend from a connection string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unsupported scheme
    pub fn detect(url: &str) -> AppResult<Self> {
        let url = url.trim();
        if url.eq_ignore_ascii_case("memory") {
            Ok(Self::Memory)
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            Err(AppError::config(format!(
                "Unsupported database URL '{url}', expected 'sqlite:...' or 'memory'"
            )))
        }
    }
}

/// Open and migrate the backend named by `url`
///
/// # Errors
///
/// Returns an error for an unsupported URL or when the database cannot be opened
pub async fn connect(url: &str) -> AppResult<Arc<dyn WellnessRepository>> {
    let repository: Arc<dyn WellnessRepository> = match DatabaseType::detect(url)? {
        DatabaseType::Memory => Arc::new(MemoryRepository::new()),
        DatabaseType::Sqlite => Arc::new(SqliteRepository::connect(url).await?),
    };
    repository.migrate().await?;
    info!(backend = repository.backend_name(), "Database ready");
    Ok(repository)
}

/// Keep the newest `limit` rows of a list sorted oldest first
pub(crate) fn keep_most_recent<T>(mut rows: Vec<T>, limit: Option<u32>) -> Vec<T> {
    if let Some(limit) = limit {
        let limit = limit as usize;
        if rows.len() > limit {
            rows.drain(..rows.len() - limit);
        }
    }
    rows
}
