// ABOUTME: Application-wide constants for drills, fatigue, difficulty, quizzes and mini-tests
// ABOUTME: Grouped into submodules by domain so call sites read as fatigue::BASE_INCREASE etc.
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Application constants organized by domain

/// Service names used in structured logs
pub mod service_names {
    /// HTTP server service name
    pub const TEX_VISION_SERVER: &str = "tex-vision-server";
}

/// Session fatigue model
pub mod fatigue {
    /// Fatigue added by every completed drill
    pub const BASE_INCREASE: f64 = 8.0;
    /// Extra fatigue when accuracy falls below `LOW_ACCURACY_THRESHOLD`
    pub const LOW_ACCURACY_PENALTY: f64 = 5.0;
    /// Accuracy (percent) under which the penalty applies
    pub const LOW_ACCURACY_THRESHOLD: f64 = 60.0;
    /// Every this many completed drills the escalation term grows
    pub const ESCALATION_INTERVAL: u32 = 3;
    /// Escalation added per completed interval
    pub const ESCALATION_STEP: f64 = 2.0;
    /// Fatigue ceiling
    pub const MAX: f64 = 100.0;
    /// Linear decay per second while on a break
    pub const BREAK_DECAY_PER_SEC: f64 = 0.5;
    /// Fatigue at which the conclusion screen recommends a break
    pub const BREAK_RECOMMENDED_AT: f64 = 70.0;
}

/// Session phase timing and completion validation
pub mod session {
    /// Countdown length before a drill starts (1 Hz ticks)
    pub const COUNTDOWN_SECS: u32 = 3;
    /// Length of an optional break
    pub const BREAK_SECS: u32 = 30;
    /// Interactions below which a completion is flagged as suspicious
    pub const MIN_INTERACTIONS: u32 = 3;
    /// Active play time below which a completion is flagged as suspicious
    pub const MIN_ACTIVE_MS: u64 = 5_000;
}

/// Adaptive difficulty
pub mod difficulty {
    /// Lowest difficulty level
    pub const MIN_LEVEL: u8 = 1;
    /// Highest difficulty level
    pub const MAX_LEVEL: u8 = 10;
    /// Level for a drill with no history
    pub const DEFAULT_LEVEL: u8 = 5;
    /// Attempts considered when recommending an adjustment
    pub const HISTORY_WINDOW: usize = 5;
    /// Mean accuracy at or above which the level goes up
    pub const INCREASE_ACCURACY: f64 = 85.0;
    /// Mean reaction time at or below which the level may go up
    pub const INCREASE_MAX_REACTION_MS: f64 = 600.0;
    /// Mean accuracy below which the level goes down
    pub const DECREASE_ACCURACY: f64 = 60.0;
}

/// Celebration thresholds
pub mod celebration {
    /// Accuracy for a perfect run
    pub const PERFECT_ACCURACY: f64 = 100.0;
    /// Accuracy for an excellent run
    pub const EXCELLENT_ACCURACY: f64 = 90.0;
}

/// Bounds on per-process in-memory state
pub mod limits {
    /// Seconds a live drill session may go without a request before it is dropped
    pub const SESSION_IDLE_SECS: u64 = 1_800;
    /// Seconds between idle-session sweeps
    pub const SWEEP_INTERVAL_SECS: u64 = 60;
    /// Session outcomes kept per athlete, oldest dropped first
    pub const OUTCOMES_PER_USER: usize = 200;
    /// Athletes whose progress stays in memory, least recently used dropped first
    pub const TRACKED_USERS: usize = 10_000;
}

/// Client-side storage keys
pub mod storage {
    /// Key holding the JSON array of drills the athlete has completed
    pub const SEEN_DRILLS_KEY: &str = "tex_vision_seen_drills";
}

/// Wellness quiz defaults and bounds
pub mod quiz {
    /// Lowest rating on a 1-5 scale
    pub const RATING_MIN: u8 = 1;
    /// Highest rating on a 1-5 scale
    pub const RATING_MAX: u8 = 5;
    /// Neutral midpoint used as default
    pub const RATING_DEFAULT: u8 = 3;
    /// Lowest pain severity
    pub const PAIN_MIN: u8 = 1;
    /// Highest pain severity
    pub const PAIN_MAX: u8 = 10;
    /// Severity assigned when an area is first selected
    pub const PAIN_DEFAULT: u8 = 5;
    /// Default hours slept on the morning quiz
    pub const SLEEP_HOURS_DEFAULT: f64 = 8.0;
    /// Longest plausible sleep entry
    pub const SLEEP_HOURS_MAX: f64 = 24.0;
}

/// CNS reaction test scoring
pub mod cns {
    /// Average at or under which the score is 100
    pub const FAST_MS: f64 = 200.0;
    /// Average at or over which the score is 0
    pub const SLOW_MS: f64 = 600.0;
    /// Milliseconds per lost point between the two bounds
    pub const MS_PER_POINT: f64 = 4.0;
}

/// Single-leg balance test
pub mod balance {
    /// Left/right difference (percent) above which asymmetry is significant
    pub const ASYMMETRY_THRESHOLD_PERCENT: f64 = 20.0;
}

/// Pain pattern detection
pub mod pain {
    /// Consecutive calendar days that trigger a body-line notification
    pub const CONSECUTIVE_DAYS_THRESHOLD: u32 = 3;
    /// Days of quiz history analysed when the caller gives no window
    pub const DEFAULT_WINDOW_DAYS: u32 = 30;
}
