// ABOUTME: Wellness quiz routes for submitting check-ins, listing history and fetching empty templates
// ABOUTME: Submissions go through RepositorySubmitter so validation and audit logging stay in one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::user_id;
use crate::database::QuizFilter;
use crate::quiz::{QuizSubmitter, QuizTemplate, RepositorySubmitter};
use crate::resources::ServerResources;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tex_vision_core::errors::AppError;
use tex_vision_core::models::{QuizType, WellnessQuizPayload};

/// Query of GET /api/quizzes/template/:quiz_type
#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    /// Entry date, today when absent
    pub date: Option<NaiveDate>,
}

/// Wellness quiz routes
pub struct QuizRoutes;

impl QuizRoutes {
    /// Create all quiz routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/quizzes",
                get(Self::handle_list).post(Self::handle_submit),
            )
            .route(
                "/api/quizzes/template/:quiz_type",
                get(Self::handle_template),
            )
            .with_state(resources)
    }

    /// Handle POST /api/quizzes
    async fn handle_submit(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(payload): Json<WellnessQuizPayload>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let submitter = RepositorySubmitter::new(Arc::clone(&resources.database), user);
        let record = submitter.submit(payload).await?;
        Ok((StatusCode::CREATED, Json(record)).into_response())
    }

    /// Handle GET /api/quizzes
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(filter): Query<QuizFilter>,
    ) -> Result<Response, AppError> {
        let user = user_id(&headers)?;
        let records = resources.database.list_quizzes(user, filter).await?;
        Ok((StatusCode::OK, Json(records)).into_response())
    }

    /// Handle GET /api/quizzes/template/:quiz_type
    async fn handle_template(
        Path(quiz_type): Path<String>,
        Query(query): Query<TemplateQuery>,
    ) -> Result<Response, AppError> {
        let quiz_type = quiz_type
            .parse::<QuizType>()
            .map_err(|_| AppError::not_found(format!("Quiz type '{quiz_type}'")))?;
        let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
        Ok((StatusCode::OK, Json(QuizTemplate::for_type(quiz_type, date))).into_response())
    }
}
