// ABOUTME: Compile-time registry mapping every DrillId to its engine family and tier constants
// ABOUTME: build_drill seeds the drill's RNG and constructs the boxed engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use super::sequence::{sequence_params, SequenceParams, SequenceRecall};
use super::stimulus::{
    ColorFlash, ContrastSensitivity, DynamicAcuity, FlankerFocus, GoNoGo, NearFarFocus,
    PeripheralExpansion, PeripheralFlash, ReactionTap, SaccadeJump, SplitAttention, StimulusDrill,
    StimulusKind, StimulusRule, StimulusTiming, VisualSearch,
};
use super::timing::{anticipation_params, AnticipationParams, AnticipationTiming};
use super::tracking::{
    ball_tracking_params, tracking_params, BallTracking, BallTrackingParams,
    MultipleObjectTracking, TrackingParams,
};
use super::{Drill, DrillConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tex_vision_core::models::{DrillId, Tier};
use tracing::debug;

/// Engine family a drill runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillFamily {
    /// Timed stimulus, judged per trial
    Stimulus,
    /// Moving objects
    Tracking,
    /// Sequence memory
    Sequence,
    /// Coincidence timing
    Timing,
}

/// Engine a drill runs on, down to the stimulus rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Stimulus engine with the given rule
    Stimulus(StimulusKind),
    /// Multiple-object tracking
    Tracking,
    /// Ball tracking
    BallTracking,
    /// Sequence recall
    Sequence,
    /// Anticipation timing
    Timing,
}

/// Engine of a drill
#[must_use]
pub const fn engine_of(drill: DrillId) -> Engine {
    match drill {
        DrillId::MultipleObjectTracking => Engine::Tracking,
        DrillId::BallTracking => Engine::BallTracking,
        DrillId::SequenceRecall => Engine::Sequence,
        DrillId::AnticipationTiming => Engine::Timing,
        DrillId::ColorFlash => Engine::Stimulus(StimulusKind::ColorFlash),
        DrillId::ReactionTap => Engine::Stimulus(StimulusKind::ReactionTap),
        DrillId::GoNoGo => Engine::Stimulus(StimulusKind::GoNoGo),
        DrillId::PeripheralFlash => Engine::Stimulus(StimulusKind::PeripheralFlash),
        DrillId::PeripheralExpansion => Engine::Stimulus(StimulusKind::PeripheralExpansion),
        DrillId::ContrastSensitivity => Engine::Stimulus(StimulusKind::ContrastSensitivity),
        DrillId::FlankerFocus => Engine::Stimulus(StimulusKind::FlankerFocus),
        DrillId::SaccadeJump => Engine::Stimulus(StimulusKind::SaccadeJump),
        DrillId::NearFarFocus => Engine::Stimulus(StimulusKind::NearFarFocus),
        DrillId::DynamicAcuity => Engine::Stimulus(StimulusKind::DynamicAcuity),
        DrillId::VisualSearch => Engine::Stimulus(StimulusKind::VisualSearch),
        DrillId::SplitAttention => Engine::Stimulus(StimulusKind::SplitAttention),
    }
}

/// Engine family of a drill
#[must_use]
pub const fn family(drill: DrillId) -> DrillFamily {
    match engine_of(drill) {
        Engine::Stimulus(_) => DrillFamily::Stimulus,
        Engine::Tracking | Engine::BallTracking => DrillFamily::Tracking,
        Engine::Sequence => DrillFamily::Sequence,
        Engine::Timing => DrillFamily::Timing,
    }
}

/// Tier constants of a drill, as shown in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum TierProfile {
    /// Stimulus drill timing
    Stimulus(StimulusTiming),
    /// Multiple-object tracking
    Tracking(TrackingParams),
    /// Ball tracking
    BallTracking(BallTrackingParams),
    /// Sequence recall
    Sequence(SequenceParams),
    /// Anticipation timing
    Timing(AnticipationParams),
}

impl TierProfile {
    /// Rounds played at this tier
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        match self {
            Self::Stimulus(t) => t.rounds,
            Self::Tracking(t) => t.rounds,
            Self::BallTracking(t) => t.rounds,
            Self::Sequence(t) => t.rounds,
            Self::Timing(t) => t.rounds,
        }
    }
}

/// Tier constants for any drill
#[must_use]
pub const fn tier_profile(drill: DrillId, tier: Tier) -> TierProfile {
    match engine_of(drill) {
        Engine::Stimulus(kind) => TierProfile::Stimulus(kind.timing(tier)),
        Engine::Tracking => TierProfile::Tracking(tracking_params(tier)),
        Engine::BallTracking => TierProfile::BallTracking(ball_tracking_params(tier)),
        Engine::Sequence => TierProfile::Sequence(sequence_params(tier)),
        Engine::Timing => TierProfile::Timing(anticipation_params(tier)),
    }
}

fn stimulus(
    rule: impl StimulusRule + 'static,
    timing: StimulusTiming,
    config: DrillConfig,
    rng: ChaCha8Rng,
) -> Box<dyn Drill> {
    Box::new(StimulusDrill::new(Box::new(rule), timing, config, rng))
}

fn build_stimulus(kind: StimulusKind, config: DrillConfig, mut rng: ChaCha8Rng) -> Box<dyn Drill> {
    let tier = config.tier;
    let timing = kind.timing(tier);
    match kind {
        StimulusKind::ColorFlash => {
            let rule = ColorFlash::new(&mut rng);
            stimulus(rule, timing, config, rng)
        }
        StimulusKind::SaccadeJump => {
            let rule = SaccadeJump::new(&mut rng);
            stimulus(rule, timing, config, rng)
        }
        StimulusKind::ReactionTap => stimulus(ReactionTap, timing, config, rng),
        StimulusKind::GoNoGo => stimulus(GoNoGo::new(tier), timing, config, rng),
        StimulusKind::PeripheralFlash => stimulus(PeripheralFlash::new(tier), timing, config, rng),
        StimulusKind::PeripheralExpansion => {
            stimulus(PeripheralExpansion::new(tier), timing, config, rng)
        }
        StimulusKind::ContrastSensitivity => {
            stimulus(ContrastSensitivity::new(tier), timing, config, rng)
        }
        StimulusKind::FlankerFocus => stimulus(FlankerFocus::new(tier), timing, config, rng),
        StimulusKind::NearFarFocus => stimulus(NearFarFocus::new(tier), timing, config, rng),
        StimulusKind::DynamicAcuity => stimulus(DynamicAcuity::new(tier), timing, config, rng),
        StimulusKind::VisualSearch => stimulus(VisualSearch::new(tier), timing, config, rng),
        StimulusKind::SplitAttention => stimulus(SplitAttention::new(tier), timing, config, rng),
    }
}

/// Construct a playable drill
///
/// All randomness flows from `config.seed`, so the same id and config
/// always produce the same stimulus stream.
#[must_use]
pub fn build_drill(drill: DrillId, config: DrillConfig) -> Box<dyn Drill> {
    let rng = ChaCha8Rng::seed_from_u64(config.seed);
    debug!(drill = %drill, tier = %config.tier, seed = config.seed, "Building drill");

    match engine_of(drill) {
        Engine::Stimulus(kind) => build_stimulus(kind, config, rng),
        Engine::Tracking => Box::new(MultipleObjectTracking::new(config, rng)),
        Engine::BallTracking => Box::new(BallTracking::new(config, rng)),
        Engine::Sequence => Box::new(SequenceRecall::new(config, rng)),
        Engine::Timing => Box::new(AnticipationTiming::new(config, rng)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_drill_builds_at_every_tier() {
        for id in DrillId::ALL {
            for tier in Tier::ALL {
                let drill = build_drill(id, DrillConfig::new(tier, 1));
                assert_eq!(drill.id(), id);
                assert_eq!(drill.view().total_rounds, tier_profile(id, tier).rounds());
                assert!(!drill.is_complete());
            }
        }
    }

    #[test]
    fn test_stimulus_kinds_map_back_to_their_drill() {
        for kind in StimulusKind::ALL {
            assert_eq!(engine_of(kind.drill_id()), Engine::Stimulus(kind));
        }
        let stimulus_drills = DrillId::ALL
            .iter()
            .filter(|id| matches!(engine_of(**id), Engine::Stimulus(_)))
            .count();
        assert_eq!(stimulus_drills, StimulusKind::ALL.len());
    }

    #[test]
    fn test_family_matches_profile() {
        for id in DrillId::ALL {
            let is_stimulus = matches!(tier_profile(id, Tier::Beginner), TierProfile::Stimulus(_));
            assert_eq!(is_stimulus, family(id) == DrillFamily::Stimulus);
        }
    }
}
