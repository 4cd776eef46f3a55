// ABOUTME: HTTP route tests driven through the full router with tower's oneshot
// ABOUTME: Covers health, drill catalog, sessions, quizzes, pain insights, mini-tests and records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tex_vision::config::{ServerConfig, SessionConfig};
use tex_vision::database::MemoryRepository;
use tex_vision::resources::ServerResources;
use tex_vision::routes::{self, USER_ID_HEADER};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    resources: Arc<ServerResources>,
    user: Uuid,
    _data_dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let data_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            http_port: 0,
            database_url: "memory".to_owned(),
            data_dir: data_dir.path().to_path_buf(),
            session: SessionConfig::default(),
        };
        let resources = Arc::new(ServerResources::new(
            config,
            Arc::new(MemoryRepository::new()),
        ));
        Self {
            router: routes::router(Arc::clone(&resources)),
            resources,
            user: Uuid::new_v4(),
            _data_dir: data_dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(Some(self.user), method, uri, body).await
    }

    async fn send_as(
        &self,
        user: Option<Uuid>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let (status, body) = app.send_as(None, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = app.send_as(None, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_drill_catalog() {
    let app = TestApp::new();
    let (status, body) = app.send_as(None, Method::GET, "/api/drills", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 16);

    let (status, body) = app
        .send_as(None, Method::GET, "/api/drills/color-flash", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "color-flash");
    assert!(body["tiers"]["elite"].is_object());

    let (status, _) = app
        .send_as(None, Method::GET, "/api/drills/laser-eyes", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_header_is_required() {
    let app = TestApp::new();
    let (status, body) = app.send_as(None, Method::GET, "/api/quizzes", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");

    let request = Request::builder()
        .uri("/api/weights")
        .header(USER_ID_HEADER, "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/sessions",
            Some(json!({ "drill": "reaction-tap", "tier": "advanced", "seed": 7 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phase"], "instructions");
    assert_eq!(body["tier"], "advanced");
    let id = body["sessionId"].as_str().unwrap().to_owned();
    assert_eq!(app.resources.active_sessions(), 1);

    let events = format!("/api/sessions/{id}/events");
    let (status, body) = app
        .send(Method::POST, &events, Some(json!({ "type": "start" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "countdown");
    assert_eq!(body["countdownRemaining"], 3);

    let (_, body) = app
        .send(
            Method::POST,
            &events,
            Some(json!({ "type": "tick", "dt_ms": 3000 })),
        )
        .await;
    assert_eq!(body["phase"], "playing");
    assert_eq!(body["difficultyLevel"], 5);

    let (status, body) = app.send(Method::GET, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "playing");

    let (status, body) = app
        .send(Method::POST, &events, Some(json!({ "type": "exit" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "finished");
    assert_eq!(app.resources.active_sessions(), 0);

    let (status, _) = app.send(Method::GET, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, results) = app.send(Method::GET, "/api/results", None).await;
    assert_eq!(results, json!([]));
}

#[tokio::test]
async fn test_session_errors() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/api/sessions", Some(json!({ "drill": "laser-eyes" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");

    let (_, body) = app
        .send(Method::POST, "/api/sessions", Some(json!({ "drill": "go-no-go" })))
        .await;
    let id = body["sessionId"].as_str().unwrap().to_owned();

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/sessions/{id}/events"),
            Some(json!({ "type": "skip_tutorial" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");

    let stranger = Some(Uuid::new_v4());
    let (status, _) = app
        .send_as(stranger, Method::GET, &format!("/api/sessions/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quiz_submit_and_list() {
    let app = TestApp::new();
    let today = Utc::now().date_naive().to_string();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/quizzes",
            Some(json!({
                "entry_date": today,
                "quiz_type": "night",
                "mood": 4,
                "stress_level": 2,
                "pain_location": ["lower-back"],
                "pain_scales": { "lower-back": 5 }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quiz_type"], "night");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/quizzes",
            Some(json!({ "entry_date": today, "quiz_type": "night", "mood": 8 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALUE_OUT_OF_RANGE");

    let (status, body) = app.send(Method::GET, "/api/quizzes?quiz_type=night", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.send(Method::GET, "/api/quizzes?quiz_type=morning", None).await;
    assert_eq!(body, json!([]));

    let (_, other) = app
        .send_as(Some(Uuid::new_v4()), Method::GET, "/api/quizzes", None)
        .await;
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn test_quiz_template() {
    let app = TestApp::new();
    let (status, body) = app
        .send_as(
            None,
            Method::GET,
            "/api/quizzes/template/pre_lift?date=2025-03-01",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quizType"], "pre_lift");
    assert_eq!(body["defaults"]["entry_date"], "2025-03-01");
    assert_eq!(body["defaults"]["mental_readiness"], 3);

    let (status, _) = app
        .send_as(None, Method::GET, "/api/quizzes/template/lunch", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pain_views() {
    let app = TestApp::new();
    let today = Utc::now().date_naive().to_string();
    app.send(
        Method::POST,
        "/api/quizzes",
        Some(json!({
            "entry_date": today,
            "quiz_type": "morning",
            "pain_location": ["left-knee"],
            "pain_scales": { "left-knee": 4 }
        })),
    )
    .await;

    let (status, body) = app.send(Method::GET, "/api/pain/heatmap?days=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries_analyzed"], 1);
    let knee = body["areas"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["area"] == "left-knee")
        .unwrap()
        .clone();
    assert_eq!(knee["frequency"], 1);
    assert_eq!(knee["intensity"], "occasional");

    let (status, body) = app.send(Method::GET, "/api/pain/patterns", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streaks"], json!([]));
    assert!(body["notification"].is_null());

    let (status, _) = app.send(Method::GET, "/api/pain/heatmap?days=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mini_test_scoring() {
    let app = TestApp::new();
    let (status, body) = app
        .send_as(
            None,
            Method::POST,
            "/api/cns/reaction-score",
            Some(json!({ "taps_ms": [200.0, 200.0, 200.0] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 100.0);
    assert_eq!(body["readiness"], "primed");

    let (status, _) = app
        .send_as(
            None,
            Method::POST,
            "/api/cns/reaction-score",
            Some(json!({ "taps_ms": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send_as(
            None,
            Method::POST,
            "/api/balance/asymmetry",
            Some(json!({ "left_secs": 20.0, "right_secs": 40.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["significant"], true);
}

#[tokio::test]
async fn test_records_and_progress() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/weights",
            Some(json!({ "entry_date": "2025-04-02", "weight_lbs": 172.4 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["weight_lbs"], 172.4);

    let (_, body) = app.send(Method::GET, "/api/weights", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/coach-overrides",
            Some(json!({
                "session_id": Uuid::new_v4(),
                "coach_id": Uuid::new_v4(),
                "original_grade": "C",
                "override_grade": "B"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = app.send(Method::GET, "/api/coach-overrides", None).await;
    assert_eq!(body[0]["override_grade"], "B");

    let (status, body) = app
        .send(Method::GET, "/api/personal-bests/color-flash/beginner", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["personalBest"].is_null());

    let (status, body) = app.send(Method::GET, "/api/difficulty/visual-search", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["level"], 5);

    let (status, _) = app.send(Method::GET, "/api/difficulty/laser-eyes", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
