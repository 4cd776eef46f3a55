// ABOUTME: Insight routes for the pain heatmap, fascia-line pain patterns and the CNS and balance mini-tests
// ABOUTME: Pain views read the caller's recent quizzes; mini-tests are pure computations over the request body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::user_id;
use crate::database::QuizFilter;
use crate::resources::ServerResources;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tex_vision_core::constants::pain::DEFAULT_WINDOW_DAYS;
use tex_vision_core::errors::{AppError, AppResult};
use tex_vision_core::models::PainLogEntry;
use tex_vision_insights::{
    BalanceTest, CnsTest, FasciaNotification, PainHeatmap, PainPatternDetector, PainStreak,
};
use uuid::Uuid;

/// History window for pain views
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    /// Days back from today, inclusive
    pub days: Option<u32>,
}

/// Body of POST /api/cns/reaction-score
#[derive(Debug, Deserialize)]
pub struct ReactionScoreBody {
    /// Tap reaction times in milliseconds
    pub taps_ms: Vec<f64>,
}

/// Body of POST /api/balance/asymmetry
#[derive(Debug, Deserialize)]
pub struct BalanceBody {
    /// Left-leg hold in seconds
    pub left_secs: f64,
    /// Right-leg hold in seconds
    pub right_secs: f64,
}

/// Response of GET /api/pain/patterns
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPatternsResponse {
    /// Every area logged on enough consecutive days
    pub streaks: Vec<PainStreak>,
    /// Notification for the strongest streak, if any
    pub notification: Option<FasciaNotification>,
}

/// Insight routes
pub struct InsightRoutes;

impl InsightRoutes {
    /// Create all insight routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/pain/heatmap", get(Self::handle_heatmap))
            .route("/api/pain/patterns", get(Self::handle_patterns))
            .route("/api/cns/reaction-score", post(Self::handle_reaction_score))
            .route("/api/balance/asymmetry", post(Self::handle_balance))
            .with_state(resources)
    }

    async fn pain_log(
        resources: &ServerResources,
        user: Uuid,
        days: Option<u32>,
    ) -> AppResult<Vec<PainLogEntry>> {
        let days = days.unwrap_or(DEFAULT_WINDOW_DAYS);
        if days == 0 {
            return Err(AppError::out_of_range("days must be at least 1"));
        }
        let since = Utc::now().date_naive() - Duration::days(i64::from(days) - 1);
        let records = resources
            .database
            .list_quizzes(user, QuizFilter::since(since))
            .await?;
        Ok(records.iter().map(PainLogEntry::from).collect())
    }

    /// Handle GET /api/pain/heatmap
    async fn handle_heatmap(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let entries = Self::pain_log(&resources, user, query.days).await?;
        Ok((StatusCode::OK, Json(PainHeatmap::build(&entries))).into_response())
    }

    /// Handle GET /api/pain/patterns
    async fn handle_patterns(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<WindowQuery>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let entries = Self::pain_log(&resources, user, query.days).await?;
        let response = PainPatternsResponse {
            streaks: PainPatternDetector::consecutive_pain_streaks(&entries),
            notification: PainPatternDetector::fascia_notification(&entries),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/cns/reaction-score
    async fn handle_reaction_score(
        Json(body): Json<ReactionScoreBody>,
    ) -> Result<Response, AppError> {
        let result = CnsTest::evaluate(&body.taps_ms)?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }

    /// Handle POST /api/balance/asymmetry
    async fn handle_balance(Json(body): Json<BalanceBody>) -> Result<Response, AppError> {
        let analysis = BalanceTest::analyze(body.left_secs, body.right_secs)?;
        Ok((StatusCode::OK, Json(analysis)).into_response())
    }
}
