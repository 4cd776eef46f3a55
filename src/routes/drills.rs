// ABOUTME: Drill catalog routes listing every drill with its category, engine family and tier constants
// ABOUTME: Static data only, so the router carries no server state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::drills::registry::{family, tier_profile};
use crate::drills::{DrillFamily, TierProfile};
use crate::session::{reflection_questions, ReflectionQuestion};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use tex_vision_core::errors::AppError;
use tex_vision_core::models::{DrillCategory, DrillId, Tier};

/// Catalog entry for one drill
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillSummary {
    /// Drill id
    pub id: DrillId,
    /// Display name
    pub name: &'static str,
    /// Skill category
    pub category: DrillCategory,
    /// Engine family
    pub family: DrillFamily,
    /// Constants per tier
    pub tiers: BTreeMap<Tier, TierProfile>,
    /// Questions asked after an attempt
    pub reflection_questions: Vec<ReflectionQuestion>,
}

impl DrillSummary {
    fn for_drill(id: DrillId) -> Self {
        Self {
            id,
            name: id.display_name(),
            category: id.category(),
            family: family(id),
            tiers: Tier::ALL
                .into_iter()
                .map(|tier| (tier, tier_profile(id, tier)))
                .collect(),
            reflection_questions: reflection_questions(id).to_vec(),
        }
    }
}

/// Drill catalog routes
pub struct DrillRoutes;

impl DrillRoutes {
    /// Create all catalog routes
    pub fn routes() -> Router {
        Router::new()
            .route("/api/drills", get(Self::handle_list))
            .route("/api/drills/:id", get(Self::handle_get))
    }

    /// Handle GET /api/drills
    async fn handle_list() -> Json<Vec<DrillSummary>> {
        Json(DrillId::ALL.into_iter().map(DrillSummary::for_drill).collect())
    }

    /// Handle GET /api/drills/:id
    async fn handle_get(Path(id): Path<String>) -> Result<Response, AppError> {
        let drill = id
            .parse::<DrillId>()
            .map_err(|_| AppError::not_found(format!("Drill '{id}'")))?;
        Ok((StatusCode::OK, Json(DrillSummary::for_drill(drill))).into_response())
    }
}
