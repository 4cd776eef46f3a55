// ABOUTME: Integration tests for the shared server state and its memory bounds
// ABOUTME: Covers idle session eviction, the per-user outcome cap and least-recently-used progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tex_vision::config::{ServerConfig, SessionConfig};
use tex_vision::database::MemoryRepository;
use tex_vision::resources::{ResourceLimits, ServerResources};
use tex_vision::session::{DrillSession, Phase, SessionEvent};
use tex_vision_core::errors::ErrorCode;
use tex_vision_core::models::{DrillId, Tier};
use uuid::Uuid;

fn resources(limits: ResourceLimits) -> (ServerResources, TempDir) {
    let data_dir = TempDir::new().unwrap();
    let config = ServerConfig {
        http_port: 0,
        database_url: "memory".to_owned(),
        data_dir: data_dir.path().to_path_buf(),
        session: SessionConfig::default(),
    };
    let resources =
        ServerResources::new(config, Arc::new(MemoryRepository::new())).with_limits(limits);
    (resources, data_dir)
}

fn open(resources: &ServerResources, user: Uuid, drill: DrillId) -> Uuid {
    let session = DrillSession::new(
        drill,
        Tier::Beginner,
        3,
        SessionConfig::default(),
        resources.progress(user).collaborators(),
    );
    resources.insert_session(user, session)
}

/// Play the drill out and press Done
async fn finish(resources: &ServerResources, user: Uuid, id: Uuid) {
    let session = resources.session(user, id).await.unwrap();
    let mut owned = session.lock().await;
    owned.session.handle(SessionEvent::Start).await.unwrap();
    owned
        .session
        .handle(SessionEvent::Tick { dt_ms: 3000 })
        .await
        .unwrap();
    let snap = owned
        .session
        .handle(SessionEvent::DurationElapsed)
        .await
        .unwrap();
    if snap.phase == Phase::Reflection {
        owned
            .session
            .handle(SessionEvent::SkipReflection)
            .await
            .unwrap();
    }
    let snap = owned.session.handle(SessionEvent::Done).await.unwrap();
    assert_eq!(snap.phase, Phase::Finished);
    drop(owned);
    resources.remove_session(id);
}

#[tokio::test]
async fn test_idle_sessions_are_evicted() {
    let (resources, _dir) = resources(ResourceLimits {
        session_idle: Duration::from_millis(100),
        ..ResourceLimits::default()
    });
    let user = Uuid::new_v4();
    let stale = open(&resources, user, DrillId::ReactionTap);
    let active = open(&resources, user, DrillId::GoNoGo);

    tokio::time::sleep(Duration::from_millis(250)).await;
    resources.session(user, active).await.unwrap();

    assert_eq!(resources.evict_idle_sessions(), 1);
    assert_eq!(resources.active_sessions(), 1);
    let err = resources.session(user, stale).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert!(resources.session(user, active).await.is_ok());
}

#[tokio::test]
async fn test_opening_a_session_sweeps_idle_ones() {
    let (resources, _dir) = resources(ResourceLimits {
        session_idle: Duration::from_millis(50),
        ..ResourceLimits::default()
    });
    let user = Uuid::new_v4();
    open(&resources, user, DrillId::ReactionTap);
    open(&resources, user, DrillId::ColorFlash);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let fresh = open(&resources, user, DrillId::GoNoGo);

    assert_eq!(resources.active_sessions(), 1);
    assert!(resources.session(user, fresh).await.is_ok());
}

#[tokio::test]
async fn test_fresh_sessions_survive_default_limits() {
    let (resources, _dir) = resources(ResourceLimits::default());
    let user = Uuid::new_v4();
    open(&resources, user, DrillId::ReactionTap);
    assert_eq!(resources.evict_idle_sessions(), 0);
    assert_eq!(resources.active_sessions(), 1);
}

#[tokio::test]
async fn test_outcomes_keep_only_the_newest() {
    let (resources, _dir) = resources(ResourceLimits {
        outcomes_per_user: 2,
        ..ResourceLimits::default()
    });
    let user = Uuid::new_v4();
    for drill in [DrillId::ReactionTap, DrillId::GoNoGo, DrillId::ColorFlash] {
        let id = open(&resources, user, drill);
        finish(&resources, user, id).await;
    }

    let kept: Vec<DrillId> = resources
        .outcomes(user)
        .iter()
        .map(|o| o.result.drill_type)
        .collect();
    assert_eq!(kept, vec![DrillId::GoNoGo, DrillId::ColorFlash]);
    assert!(resources.outcomes(Uuid::new_v4()).is_empty());
}

#[tokio::test]
async fn test_progress_evicts_least_recently_used_user() {
    let (resources, _dir) = resources(ResourceLimits {
        tracked_users: 2,
        ..ResourceLimits::default()
    });
    let (first, second, third) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let id = open(&resources, first, DrillId::ReactionTap);
    finish(&resources, first, id).await;
    let kept = resources.progress(first);
    let _ = resources.progress(second);
    // Touch the first user again so the second becomes the oldest
    let again = resources.progress(first);
    assert!(Arc::ptr_eq(&kept, &again));

    let _ = resources.progress(third);
    assert_eq!(resources.tracked_users(), 2);
    assert!(Arc::ptr_eq(&kept, &resources.progress(first)));
    assert_eq!(resources.outcomes(first).len(), 1);

    // The second user comes back with fresh progress, pushing out the third
    let _ = resources.progress(second);
    assert_eq!(resources.tracked_users(), 2);
    assert_eq!(resources.outcomes(first).len(), 1);
}

#[tokio::test]
async fn test_evicted_user_loses_outcomes() {
    let (resources, _dir) = resources(ResourceLimits {
        tracked_users: 1,
        ..ResourceLimits::default()
    });
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
    let id = open(&resources, first, DrillId::ReactionTap);
    finish(&resources, first, id).await;
    assert_eq!(resources.outcomes(first).len(), 1);

    let _ = resources.progress(second);
    assert_eq!(resources.tracked_users(), 1);
    assert!(resources.outcomes(first).is_empty());
}
