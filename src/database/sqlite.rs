// ABOUTME: SQLite WellnessRepository using sqlx with runtime table creation
// ABOUTME: Quiz payloads are stored as JSON text next to indexed date and type columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::{keep_most_recent, QuizFilter, WellnessRepository};
use crate::logging::AppLogger;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Instant;
use tex_vision_core::errors::{AppError, AppResult};
use tex_vision_core::models::{
    CoachOverride, NewCoachOverride, NewWeightEntry, WeightEntry, WellnessQuizPayload,
    WellnessQuizRecord,
};
use tracing::debug;
use uuid::Uuid;

const SCHEMA: [&str; 6] = [
    r"CREATE TABLE IF NOT EXISTS wellness_quizzes (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        entry_date TEXT NOT NULL,
        quiz_type TEXT NOT NULL,
        payload TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_wellness_quizzes_user_date ON wellness_quizzes(user_id, entry_date)",
    r"CREATE TABLE IF NOT EXISTS weight_entries (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        entry_date TEXT NOT NULL,
        weight_lbs REAL NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_weight_entries_user ON weight_entries(user_id, entry_date)",
    r"CREATE TABLE IF NOT EXISTS coach_overrides (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        session_id TEXT NOT NULL,
        coach_id TEXT NOT NULL,
        original_grade TEXT NOT NULL,
        override_grade TEXT NOT NULL,
        override_reason TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_coach_overrides_user ON coach_overrides(user_id, created_at)",
];

/// `SQLite` repository
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if needed) the database at `url`
    ///
    /// In-memory URLs use a single connection so every query sees the same database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the URL is invalid or the pool cannot be opened
    pub async fn connect(url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::database(format!("Invalid SQLite URL '{url}': {e}")))?
            .create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open SQLite database: {e}")))?;
        debug!(max_connections, "SQLite pool opened");
        Ok(Self { pool })
    }
}

fn parse_uuid(row: &SqliteRow, column: &str) -> AppResult<Uuid> {
    let raw: String = row
        .try_get(column)
        .map_err(|e| AppError::database(format!("Missing column {column}: {e}")))?;
    Uuid::parse_str(&raw)
        .map_err(|e| AppError::database(format!("Invalid UUID in {column}: {e}")))
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> AppResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| AppError::database(format!("Failed to read column {name}: {e}")))
}

fn row_to_quiz(row: &SqliteRow) -> AppResult<WellnessQuizRecord> {
    let payload: String = column(row, "payload")?;
    let payload: WellnessQuizPayload = serde_json::from_str(&payload)
        .map_err(|e| AppError::database(format!("Corrupt quiz payload: {e}")))?;
    Ok(WellnessQuizRecord {
        id: parse_uuid(row, "id")?,
        user_id: parse_uuid(row, "user_id")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        payload,
    })
}

fn row_to_weight(row: &SqliteRow) -> AppResult<WeightEntry> {
    Ok(WeightEntry {
        id: parse_uuid(row, "id")?,
        user_id: parse_uuid(row, "user_id")?,
        entry_date: column::<NaiveDate>(row, "entry_date")?,
        weight_lbs: column(row, "weight_lbs")?,
        created_at: column(row, "created_at")?,
    })
}

fn row_to_override(row: &SqliteRow) -> AppResult<CoachOverride> {
    Ok(CoachOverride {
        id: parse_uuid(row, "id")?,
        user_id: parse_uuid(row, "user_id")?,
        session_id: parse_uuid(row, "session_id")?,
        coach_id: parse_uuid(row, "coach_id")?,
        original_grade: column(row, "original_grade")?,
        override_grade: column(row, "override_grade")?,
        override_reason: column(row, "override_reason")?,
        created_at: column(row, "created_at")?,
    })
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl WellnessRepository for SqliteRepository {
    async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration failed: {e}")))?;
        }
        Ok(())
    }

    async fn insert_quiz(
        &self,
        user_id: Uuid,
        payload: WellnessQuizPayload,
    ) -> AppResult<WellnessQuizRecord> {
        payload.validate()?;
        let started = Instant::now();
        let record = WellnessQuizRecord {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
            payload,
        };
        let body = serde_json::to_string(&record.payload)?;
        let result = sqlx::query(
            r"INSERT INTO wellness_quizzes (id, user_id, entry_date, quiz_type, payload, created_at)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(record.id.to_string())
        .bind(user_id.to_string())
        .bind(record.payload.entry_date)
        .bind(record.payload.quiz_type.as_str())
        .bind(body)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;
        AppLogger::log_database_operation(
            "insert",
            "wellness_quizzes",
            result.is_ok(),
            elapsed_ms(started),
        );
        result.map_err(|e| AppError::database(format!("Failed to insert quiz: {e}")))?;
        Ok(record)
    }

    async fn list_quizzes(
        &self,
        user_id: Uuid,
        filter: QuizFilter,
    ) -> AppResult<Vec<WellnessQuizRecord>> {
        let rows = sqlx::query(
            r"SELECT id, user_id, payload, created_at FROM wellness_quizzes
              WHERE user_id = ?1
                AND (?2 IS NULL OR quiz_type = ?2)
                AND (?3 IS NULL OR entry_date >= ?3)
              ORDER BY entry_date ASC, created_at ASC",
        )
        .bind(user_id.to_string())
        .bind(filter.quiz_type.map(|t| t.as_str()))
        .bind(filter.since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list quizzes: {e}")))?;

        let records = rows.iter().map(row_to_quiz).collect::<AppResult<Vec<_>>>()?;
        Ok(keep_most_recent(records, filter.limit))
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
        sqlx::query(
            r"INSERT INTO weight_entries (id, user_id, entry_date, weight_lbs, created_at)
              VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(row.id.to_string())
        .bind(user_id.to_string())
        .bind(row.entry_date)
        .bind(row.weight_lbs)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert weight entry: {e}")))?;
        Ok(row)
    }

    async fn list_weights(&self, user_id: Uuid) -> AppResult<Vec<WeightEntry>> {
        sqlx::query(
            r"SELECT id, user_id, entry_date, weight_lbs, created_at FROM weight_entries
              WHERE user_id = ?1 ORDER BY entry_date ASC, created_at ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list weight entries: {e}")))?
        .iter()
        .map(row_to_weight)
        .collect()
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
        sqlx::query(
            r"INSERT INTO coach_overrides
                (id, user_id, session_id, coach_id, original_grade, override_grade, override_reason, created_at)
              VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(row.id.to_string())
        .bind(user_id.to_string())
        .bind(row.session_id.to_string())
        .bind(row.coach_id.to_string())
        .bind(&row.original_grade)
        .bind(&row.override_grade)
        .bind(&row.override_reason)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert coach override: {e}")))?;
        Ok(row)
    }

    async fn list_coach_overrides(&self, user_id: Uuid) -> AppResult<Vec<CoachOverride>> {
        sqlx::query(
            r"SELECT id, user_id, session_id, coach_id, original_grade, override_grade,
                     override_reason, created_at
              FROM coach_overrides WHERE user_id = ?1 ORDER BY created_at ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list coach overrides: {e}")))?
        .iter()
        .map(row_to_override)
        .collect()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
