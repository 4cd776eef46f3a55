// ABOUTME: Drill session routes for opening a session, reading its snapshot and posting events
// ABOUTME: Sessions live in ServerResources and are dropped once they reach the finished phase
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::user_id;
use crate::resources::ServerResources;
use crate::session::{Phase, SessionEvent, SessionHandle};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tex_vision_core::errors::AppError;
use tex_vision_core::models::Tier;
use tracing::info;
use uuid::Uuid;

/// Body of POST /api/sessions
#[derive(Debug, Deserialize)]
pub struct OpenSessionBody {
    /// Drill id, as in the catalog
    pub drill: String,
    /// Difficulty tier
    #[serde(default)]
    pub tier: Tier,
    /// Fixed seed for a reproducible stimulus stream
    pub seed: Option<u64>,
}

/// Drill session routes
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sessions", post(Self::handle_open))
            .route("/api/sessions/:id", get(Self::handle_get))
            .route("/api/sessions/:id/events", post(Self::handle_event))
            .with_state(resources)
    }

    /// Handle POST /api/sessions
    async fn handle_open(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<OpenSessionBody>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let progress = resources.progress(user);
        let handle = SessionHandle::open(
            &body.drill,
            body.tier,
            body.seed.unwrap_or_else(rand::random),
            resources.config.session.clone(),
            progress.collaborators(),
        );
        let session = match handle {
            SessionHandle::Active(session) => *session,
            SessionHandle::NotFound { requested } => {
                return Err(AppError::not_found(format!("Drill '{requested}'")));
            }
        };

        let snapshot = session.snapshot();
        let id = resources.insert_session(user, session);
        info!(user.id = %user, session.id = %id, drill = %snapshot.drill, "Session opened");
        Ok((StatusCode::CREATED, Json(snapshot)).into_response())
    }

    /// Handle GET /api/sessions/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let session = resources.session(user, id).await?;
        let snapshot = session.lock().await.session.snapshot();
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }

    /// Handle POST /api/sessions/:id/events
    async fn handle_event(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(event): Json<SessionEvent>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let session = resources.session(user, id).await?;
        let snapshot = session.lock().await.session.handle(event).await?;
        if snapshot.phase == Phase::Finished {
            resources.remove_session(id);
            info!(user.id = %user, session.id = %id, "Session finished");
        }
        Ok((StatusCode::OK, Json(snapshot)).into_response())
    }
}
