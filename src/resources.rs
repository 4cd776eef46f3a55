// ABOUTME: Shared server state: configuration, repository, per-user progress and live drill sessions
// ABOUTME: Handed to every route module as Arc<ServerResources>; idle sessions and old users are evicted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::config::ServerConfig;
use crate::database::WellnessRepository;
use crate::session::{
    DrillSession, InMemoryDifficulty, InMemoryPersonalBests, JsonFileSeenDrills,
    SessionCollaborators, SessionOutcome,
};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tex_vision_core::constants::limits;
use tex_vision_core::errors::{AppError, AppResult};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Progress collaborators for one athlete
pub struct UserProgress {
    /// Adaptive difficulty per drill
    pub difficulty: Arc<InMemoryDifficulty>,
    /// Personal bests per drill and tier
    pub personal_bests: Arc<InMemoryPersonalBests>,
    /// Drills already played, stored under the data directory
    pub seen_drills: Arc<JsonFileSeenDrills>,
}

impl UserProgress {
    fn new(config: &ServerConfig, user_id: Uuid) -> Self {
        Self {
            difficulty: Arc::new(InMemoryDifficulty::new()),
            personal_bests: Arc::new(InMemoryPersonalBests::new()),
            seen_drills: Arc::new(JsonFileSeenDrills::new(
                config.data_dir.join(user_id.to_string()),
            )),
        }
    }

    /// Collaborator bundle for a new session
    #[must_use]
    pub fn collaborators(&self) -> SessionCollaborators {
        SessionCollaborators {
            difficulty: self.difficulty.clone(),
            personal_bests: self.personal_bests.clone(),
            seen_drills: self.seen_drills.clone(),
        }
    }
}

/// A drill session and the athlete that owns it
pub struct OwnedSession {
    /// Owning user
    pub owner: Uuid,
    /// The session
    pub session: DrillSession,
}

impl std::fmt::Debug for OwnedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedSession")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Bounds on what the process keeps in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Sessions untouched for longer than this are dropped
    pub session_idle: Duration,
    /// Outcomes kept per athlete
    pub outcomes_per_user: usize,
    /// Athletes whose progress and outcomes stay in memory
    pub tracked_users: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            session_idle: Duration::from_secs(limits::SESSION_IDLE_SECS),
            outcomes_per_user: limits::OUTCOMES_PER_USER,
            tracked_users: limits::TRACKED_USERS,
        }
    }
}

struct SessionSlot {
    session: Arc<Mutex<OwnedSession>>,
    last_seen_ms: AtomicU64,
}

struct ProgressSlot {
    progress: Arc<UserProgress>,
    last_used: AtomicU64,
}

/// Everything route handlers share
pub struct ServerResources {
    /// Process configuration
    pub config: ServerConfig,
    /// Wellness storage
    pub database: Arc<dyn WellnessRepository>,
    limits: ResourceLimits,
    started: Instant,
    use_counter: AtomicU64,
    progress: DashMap<Uuid, ProgressSlot>,
    sessions: DashMap<Uuid, SessionSlot>,
    outcomes: Arc<DashMap<Uuid, VecDeque<SessionOutcome>>>,
}

impl ServerResources {
    /// Build shared state around an open repository
    #[must_use]
    pub fn new(config: ServerConfig, database: Arc<dyn WellnessRepository>) -> Self {
        Self {
            config,
            database,
            limits: ResourceLimits::default(),
            started: Instant::now(),
            use_counter: AtomicU64::new(0),
            progress: DashMap::new(),
            sessions: DashMap::new(),
            outcomes: Arc::new(DashMap::new()),
        }
    }

    /// Replace the default memory bounds
    #[must_use]
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn next_use(&self) -> u64 {
        self.use_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Progress collaborators for a user, created on first use
    ///
    /// At the user limit, the least recently used athlete's progress and
    /// outcomes are dropped to make room.
    #[must_use]
    pub fn progress(&self, user_id: Uuid) -> Arc<UserProgress> {
        let stamp = self.next_use();
        if let Some(slot) = self.progress.get(&user_id) {
            slot.last_used.store(stamp, Ordering::Relaxed);
            return Arc::clone(&slot.progress);
        }
        while self.progress.len() >= self.limits.tracked_users.max(1) {
            if !self.evict_least_recent_user() {
                break;
            }
        }
        let slot = self.progress.entry(user_id).or_insert_with(|| ProgressSlot {
            progress: Arc::new(UserProgress::new(&self.config, user_id)),
            last_used: AtomicU64::new(stamp),
        });
        Arc::clone(&slot.progress)
    }

    fn evict_least_recent_user(&self) -> bool {
        let oldest = self
            .progress
            .iter()
            .min_by_key(|entry| entry.value().last_used.load(Ordering::Relaxed))
            .map(|entry| *entry.key());
        let Some(user) = oldest else {
            return false;
        };
        self.progress.remove(&user);
        self.outcomes.remove(&user);
        debug!(user.id = %user, "Evicted least recently used progress");
        true
    }

    /// Number of athletes with progress in memory
    #[must_use]
    pub fn tracked_users(&self) -> usize {
        self.progress.len()
    }

    /// Register a session and wire its Done callback to the outcome log
    ///
    /// Idle sessions are swept first.
    pub fn insert_session(&self, owner: Uuid, session: DrillSession) -> Uuid {
        self.evict_idle_sessions();
        let id = session.id();
        let outcomes = Arc::clone(&self.outcomes);
        let cap = self.limits.outcomes_per_user.max(1);
        let session = session.with_completion_callback(Box::new(move |outcome| {
            let mut log = outcomes.entry(owner).or_default();
            log.push_back(outcome);
            while log.len() > cap {
                log.pop_front();
            }
        }));
        self.sessions.insert(
            id,
            SessionSlot {
                session: Arc::new(Mutex::new(OwnedSession { owner, session })),
                last_seen_ms: AtomicU64::new(self.elapsed_ms()),
            },
        );
        id
    }

    /// Look up a session owned by `user_id` and mark it active
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for unknown ids and sessions owned by someone else
    pub async fn session(&self, user_id: Uuid, id: Uuid) -> AppResult<Arc<Mutex<OwnedSession>>> {
        let now = self.elapsed_ms();
        let found = self.sessions.get(&id).map(|slot| {
            slot.last_seen_ms.store(now, Ordering::Relaxed);
            Arc::clone(&slot.session)
        });
        let Some(session) = found else {
            return Err(AppError::not_found(format!("Session {id}")));
        };
        if session.lock().await.owner != user_id {
            return Err(AppError::not_found(format!("Session {id}")));
        }
        Ok(session)
    }

    /// Forget a finished session
    pub fn remove_session(&self, id: Uuid) {
        self.sessions.remove(&id);
    }

    /// Drop sessions idle past the limit, returning how many went
    pub fn evict_idle_sessions(&self) -> usize {
        let idle_ms = u64::try_from(self.limits.session_idle.as_millis()).unwrap_or(u64::MAX);
        let now = self.elapsed_ms();
        let mut dropped = 0;
        self.sessions.retain(|id, slot| {
            let idle = now.saturating_sub(slot.last_seen_ms.load(Ordering::Relaxed));
            if idle <= idle_ms {
                return true;
            }
            info!(session.id = %id, idle_ms = idle, "Dropping idle session");
            dropped += 1;
            false
        });
        dropped
    }

    /// Sweep idle sessions on a fixed period until the resources are dropped
    #[must_use]
    pub fn spawn_idle_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let resources: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_secs(limits::SWEEP_INTERVAL_SECS));
            loop {
                ticker.tick().await;
                let Some(resources) = resources.upgrade() else {
                    break;
                };
                let dropped = resources.evict_idle_sessions();
                if dropped > 0 {
                    debug!(dropped, "Idle session sweep");
                }
            }
        })
    }

    /// Number of live sessions
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Outcomes of sessions the user finished with Done, oldest first
    #[must_use]
    pub fn outcomes(&self, user_id: Uuid) -> Vec<SessionOutcome> {
        self.outcomes
            .get(&user_id)
            .map(|entry| entry.value().iter().cloned().collect())
            .unwrap_or_default()
    }
}
