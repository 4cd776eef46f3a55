// ABOUTME: Drill session tuning: countdown, break, fatigue model and completion validation minima
// ABOUTME: Defaults come from core constants; TEX_VISION_* environment variables override them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tex_vision_core::constants::{fatigue, session};
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value violates a constraint
    #[error("Value out of range: {0}")]
    ValueOutOfRange(&'static str),
}

/// Tunable session constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Countdown length (seconds)
    pub countdown_secs: u32,
    /// Break length (seconds)
    pub break_secs: u32,
    /// Fatigue lost per second of break
    pub break_decay_per_sec: f64,
    /// Fatigue added per completed drill
    pub fatigue_base_increase: f64,
    /// Extra fatigue for a low-accuracy drill
    pub fatigue_low_accuracy_penalty: f64,
    /// Accuracy under which the penalty applies
    pub fatigue_low_accuracy_threshold: f64,
    /// Drills per escalation step
    pub fatigue_escalation_interval: u32,
    /// Fatigue added per escalation step
    pub fatigue_escalation_step: f64,
    /// Fatigue ceiling
    pub fatigue_max: f64,
    /// Fatigue at which a break is recommended
    pub break_recommended_at: f64,
    /// Interactions below which a completion is logged as suspicious
    pub min_interactions: u32,
    /// Active milliseconds below which a completion is logged as suspicious
    pub min_active_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: session::COUNTDOWN_SECS,
            break_secs: session::BREAK_SECS,
            break_decay_per_sec: fatigue::BREAK_DECAY_PER_SEC,
            fatigue_base_increase: fatigue::BASE_INCREASE,
            fatigue_low_accuracy_penalty: fatigue::LOW_ACCURACY_PENALTY,
            fatigue_low_accuracy_threshold: fatigue::LOW_ACCURACY_THRESHOLD,
            fatigue_escalation_interval: fatigue::ESCALATION_INTERVAL,
            fatigue_escalation_step: fatigue::ESCALATION_STEP,
            fatigue_max: fatigue::MAX,
            break_recommended_at: fatigue::BREAK_RECOMMENDED_AT,
            min_interactions: session::MIN_INTERACTIONS,
            min_active_ms: session::MIN_ACTIVE_MS,
        }
    }
}

impl SessionConfig {
    /// Defaults with `TEX_VISION_*` overrides applied, then validated
    ///
    /// # Errors
    ///
    /// Returns an error if an override does not parse or the result is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        Self::apply_env_var("TEX_VISION_COUNTDOWN_SECS", &mut config.countdown_secs)?;
        Self::apply_env_var("TEX_VISION_BREAK_SECS", &mut config.break_secs)?;
        Self::apply_env_var(
            "TEX_VISION_BREAK_DECAY_PER_SEC",
            &mut config.break_decay_per_sec,
        )?;
        Self::apply_env_var(
            "TEX_VISION_FATIGUE_BASE_INCREASE",
            &mut config.fatigue_base_increase,
        )?;
        Self::apply_env_var("TEX_VISION_FATIGUE_MAX", &mut config.fatigue_max)?;
        Self::apply_env_var(
            "TEX_VISION_BREAK_RECOMMENDED_AT",
            &mut config.break_recommended_at,
        )?;
        Self::apply_env_var("TEX_VISION_MIN_INTERACTIONS", &mut config.min_interactions)?;
        Self::apply_env_var("TEX_VISION_MIN_ACTIVE_MS", &mut config.min_active_ms)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Check the constraints between fields
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` naming the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown_secs == 0 {
            return Err(ConfigError::ValueOutOfRange("countdown_secs must be > 0"));
        }
        if self.fatigue_max <= 0.0 {
            return Err(ConfigError::ValueOutOfRange("fatigue_max must be > 0"));
        }
        if self.break_decay_per_sec < 0.0 || self.fatigue_base_increase < 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "fatigue rates must not be negative",
            ));
        }
        if self.fatigue_escalation_interval == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "fatigue_escalation_interval must be > 0",
            ));
        }
        if !(0.0..=self.fatigue_max).contains(&self.break_recommended_at) {
            return Err(ConfigError::ValueOutOfRange(
                "break_recommended_at must be within 0..=fatigue_max",
            ));
        }
        Ok(())
    }
}
