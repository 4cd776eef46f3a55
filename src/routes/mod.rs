// ABOUTME: Route module organization for the Tex Vision HTTP API
// ABOUTME: Merges domain routers and applies request logging, tracing and CORS layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Route module for the Tex Vision server
//!
//! Each domain module holds route definitions and thin handlers that
//! delegate to the session, quiz, database and insight layers.

/// Drill catalog routes
pub mod drills;
/// Health check routes
pub mod health;
/// Pain heatmap, pain pattern and mini-test routes
pub mod insights;
/// Wellness quiz routes
pub mod quizzes;
/// Weight, coach override and progress routes
pub mod records;
/// Drill session routes
pub mod sessions;

pub use drills::DrillRoutes;
pub use health::HealthRoutes;
pub use insights::InsightRoutes;
pub use quizzes::QuizRoutes;
pub use records::RecordRoutes;
pub use sessions::SessionRoutes;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Header carrying the calling athlete's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Read the athlete id from the request headers
///
/// # Errors
///
/// Returns `MissingRequiredField` without the header and `InvalidInput` if it is not a UUID
pub fn user_id(headers: &HeaderMap) -> AppResult<Uuid> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::MissingRequiredField,
                format!("Missing {USER_ID_HEADER} header"),
            )
        })?;
    Uuid::parse_str(raw.trim())
        .map_err(|e| AppError::invalid_input(format!("Invalid {USER_ID_HEADER} header: {e}")))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_owned();
    let user = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);
    let started = Instant::now();

    let response = next.run(request).await;

    AppLogger::log_api_request(
        &method,
        &path,
        response.status().as_u16(),
        u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        user.as_deref(),
    );
    response
}

/// Full application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(DrillRoutes::routes())
        .merge(SessionRoutes::routes(Arc::clone(&resources)))
        .merge(QuizRoutes::routes(Arc::clone(&resources)))
        .merge(InsightRoutes::routes(Arc::clone(&resources)))
        .merge(RecordRoutes::routes(resources))
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
