// ABOUTME: Wellness analytics over quiz history for the Tex Vision platform
// ABOUTME: Pain heat-map, consecutive-day pain patterns, CNS reaction scoring and balance asymmetry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![deny(unsafe_code)]

//! # Tex Vision Insights
//!
//! Pure functions over wellness quiz rows and mini-test measurements. Nothing
//! here touches storage or the network; callers load rows and pass slices in.

/// Per-area pain frequency and intensity buckets
pub mod pain_heatmap;

/// Consecutive-day pain detection and body-line notifications
pub mod pain_patterns;



pub use balance_test::{BalanceAnalysis, BalanceTest, StrongerSide};
pub use cns_test::{CnsReadiness, CnsTest, CnsTestResult};
pub use pain_heatmap::{AreaHeat, PainHeatmap, PainIntensity};
pub use pain_patterns::{FasciaLineSummary, FasciaNotification, PainPatternDetector, PainStreak};
