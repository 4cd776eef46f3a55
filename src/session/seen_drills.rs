// ABOUTME: Persistence of the set of drills an athlete has completed at least once
// ABOUTME: JSON array file per user; unreadable or malformed content is treated as an empty set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tex_vision_core::constants::storage::SEEN_DRILLS_KEY;
use tex_vision_core::errors::{AppError, AppResult};
use tex_vision_core::models::DrillId;
use tokio::sync::RwLock;
use tracing::warn;

/// Drills the athlete has already played
#[async_trait]
pub trait SeenDrillsStore: Send + Sync {
    /// Every drill marked as seen
    async fn seen(&self) -> AppResult<BTreeSet<DrillId>>;

    /// Whether one drill was seen
    async fn has_seen(&self, drill: DrillId) -> AppResult<bool> {
        Ok(self.seen().await?.contains(&drill))
    }

    /// Record a drill as seen
    async fn mark_seen(&self, drill: DrillId) -> AppResult<()>;
}

/// File-backed store at `<dir>/tex_vision_seen_drills.json`
#[derive(Debug)]
pub struct JsonFileSeenDrills {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileSeenDrills {
    /// Store inside `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SEEN_DRILLS_KEY}.json")),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_set(&self) -> AppResult<BTreeSet<DrillId>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        Ok(parse_seen(&raw, &self.path))
    }
}

/// Parse the stored array; unknown ids are dropped, malformed JSON yields an empty set
fn parse_seen(raw: &str, path: &Path) -> BTreeSet<DrillId> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(ids) => ids.iter().filter_map(|id| id.parse().ok()).collect(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed seen-drills data, starting empty");
            BTreeSet::new()
        }
    }
}

#[async_trait]
impl SeenDrillsStore for JsonFileSeenDrills {
    async fn seen(&self) -> AppResult<BTreeSet<DrillId>> {
        self.read_set().await
    }

    async fn mark_seen(&self, drill: DrillId) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut set = self.read_set().await?;
        if !set.insert(drill) {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        let ids: Vec<&str> = set.iter().map(|d| d.as_str()).collect();
        let body = serde_json::to_string(&ids)?;
        tokio::fs::write(&self.path, body).await.map_err(|e| {
            AppError::storage(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

/// Volatile store for tests and the in-memory backend
#[derive(Debug, Default)]
pub struct InMemorySeenDrills {
    seen: RwLock<BTreeSet<DrillId>>,
}

impl InMemorySeenDrills {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeenDrillsStore for InMemorySeenDrills {
    async fn seen(&self) -> AppResult<BTreeSet<DrillId>> {
        Ok(self.seen.read().await.clone())
    }

    async fn mark_seen(&self, drill: DrillId) -> AppResult<()> {
        self.seen.write().await.insert(drill);
        Ok(())
    }
}
