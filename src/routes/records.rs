// ABOUTME: Record routes for weight entries, coach grade overrides, personal bests, difficulty and session results
// ABOUTME: Weight and override rows persist in the repository; progress views read the caller's in-memory stores
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::user_id;
use crate::resources::ServerResources;
use crate::session::{AdaptiveDifficulty, PersonalBestStore};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tex_vision_core::errors::AppError;
use tex_vision_core::models::{
    DifficultyAdjustment, DrillId, NewCoachOverride, NewWeightEntry, PersonalBest, Tier,
};

/// Response of GET /api/personal-bests/:drill/:tier
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBestResponse {
    /// Drill
    pub drill: DrillId,
    /// Tier
    pub tier: Tier,
    /// Stored records, absent before the first completed attempt
    pub personal_best: Option<PersonalBest>,
}

/// Response of GET /api/difficulty/:drill
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyResponse {
    /// Drill
    pub drill: DrillId,
    /// Current level, 1-10
    pub level: u8,
    /// What the next update would do
    pub recommendation: DifficultyAdjustment,
}

/// Record and progress routes
pub struct RecordRoutes;

impl RecordRoutes {
    /// Create all record routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/weights",
                get(Self::handle_list_weights).post(Self::handle_add_weight),
            )
            .route(
                "/api/coach-overrides",
                get(Self::handle_list_overrides).post(Self::handle_add_override),
            )
            .route(
                "/api/personal-bests/:drill/:tier",
                get(Self::handle_personal_best),
            )
            .route("/api/difficulty/:drill", get(Self::handle_difficulty))
            .route("/api/results", get(Self::handle_results))
            .with_state(resources)
    }

    fn parse_drill(raw: &str) -> Result<DrillId, AppError> {
        raw.parse::<DrillId>()
            .map_err(|_| AppError::not_found(format!("Drill '{raw}'")))
    }

    /// Handle POST /api/weights
    async fn handle_add_weight(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(entry): Json<NewWeightEntry>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let row = resources.database.insert_weight(user, entry).await?;
        Ok((StatusCode::CREATED, Json(row)).into_response())
    }

    /// Handle GET /api/weights
    async fn handle_list_weights(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let rows = resources.database.list_weights(user).await?;
        Ok((StatusCode::OK, Json(rows)).into_response())
    }

    /// Handle POST /api/coach-overrides
    async fn handle_add_override(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(entry): Json<NewCoachOverride>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let row = resources.database.insert_coach_override(user, entry).await?;
        Ok((StatusCode::CREATED, Json(row)).into_response())
    }

    /// Handle GET /api/coach-overrides
    async fn handle_list_overrides(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let rows = resources.database.list_coach_overrides(user).await?;
        Ok((StatusCode::OK, Json(rows)).into_response())
    }

    /// Handle GET /api/personal-bests/:drill/:tier
    async fn handle_personal_best(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((drill, tier)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let drill = Self::parse_drill(&drill)?;
        let tier = tier.parse::<Tier>()?;
        let personal_best = resources
            .progress(user)
            .personal_bests
            .personal_best(drill, tier)
            .await?;
        let response = PersonalBestResponse {
            drill,
            tier,
            personal_best,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/difficulty/:drill
    async fn handle_difficulty(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(drill): Path<String>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let drill = Self::parse_drill(&drill)?;
        let difficulty = Arc::clone(&resources.progress(user).difficulty);
        let response = DifficultyResponse {
            drill,
            level: difficulty.current_difficulty(drill).await?,
            recommendation: difficulty.recommended_adjustment(drill).await?,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/results
    async fn handle_results(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        Ok((StatusCode::OK, Json(resources.outcomes(user))).into_response())
    }
}
