// ABOUTME: Integration tests for pain heatmap, pain pattern detection and the CNS and balance mini-tests
// ABOUTME: Exercises the insights crate through quiz-derived pain log entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::NaiveDate;
use tex_vision_core::errors::ErrorCode;
use tex_vision_core::models::{PainLogEntry, QuizType, WellnessQuizPayload};
use tex_vision_insights::{
    BalanceTest, CnsReadiness, CnsTest, PainHeatmap, PainIntensity, PainPatternDetector,
    StrongerSide,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
}

fn entry(day: u32, areas: &[(&str, Option<u8>)]) -> PainLogEntry {
    let mut payload = WellnessQuizPayload::empty(date(day), QuizType::Night);
    for (area, level) in areas {
        payload.pain_location.push((*area).to_owned());
        if let Some(level) = level {
            payload.pain_scales.insert((*area).to_owned(), *level);
        }
    }
    PainLogEntry::from(&payload)
}

#[test]
fn test_heatmap_counts_and_averages() {
    let entries = vec![
        entry(1, &[("left-knee", Some(4)), ("neck", None)]),
        entry(2, &[("left-knee", Some(6))]),
        entry(3, &[("left-knee", None)]),
    ];
    let map = PainHeatmap::build(&entries);

    assert_eq!(map.entries_analyzed, 3);
    let knee = map.area("left-knee").unwrap();
    assert_eq!(knee.frequency, 3);
    assert_eq!(knee.intensity, PainIntensity::Moderate);
    assert_eq!(knee.average_severity, Some(5.0));
    assert_eq!(knee.label, "Left Knee");

    let neck = map.area("neck").unwrap();
    assert_eq!(neck.frequency, 1);
    assert_eq!(neck.average_severity, None);

    let head = map.area("head").unwrap();
    assert_eq!(head.intensity, PainIntensity::None);

    let hot: Vec<&str> = map.hotspots().iter().map(|a| a.area.as_str()).collect();
    assert_eq!(hot, vec!["left-knee", "neck"]);
}

#[test]
fn test_heatmap_keeps_unknown_areas() {
    let map = PainHeatmap::build(&[entry(1, &[("pinky-toe", Some(2))])]);
    let toe = map.area("pinky-toe").unwrap();
    assert_eq!(toe.label, "pinky-toe");
    assert_eq!(toe.frequency, 1);
}

#[test]
fn test_empty_log_has_every_area_cold() {
    let map = PainHeatmap::build(&[]);
    assert_eq!(map.entries_analyzed, 0);
    assert!(map.areas.iter().all(|a| a.frequency == 0));
    assert!(map.hotspots().is_empty());
}

#[test]
fn test_three_consecutive_days_trigger_notification() {
    let entries = vec![
        entry(3, &[("lower-back", Some(6))]),
        entry(1, &[("lower-back", Some(4))]),
        entry(2, &[("lower-back", None)]),
    ];
    let streaks = PainPatternDetector::consecutive_pain_streaks(&entries);
    assert_eq!(streaks.len(), 1);
    let streak = &streaks[0];
    assert_eq!(streak.area, "lower-back");
    assert_eq!(streak.days, 3);
    assert_eq!(streak.start_date, date(1));
    assert_eq!(streak.end_date, date(3));
    assert!((streak.average_severity - 5.0).abs() < f64::EPSILON);

    let note = PainPatternDetector::fascia_notification(&entries).unwrap();
    assert_eq!(note.area_label, "Lower Back");
    assert!(note
        .lines
        .iter()
        .any(|l| l.id == "superficial-back-line"));
    assert!(!note.connected_areas.contains(&"lower-back".to_owned()));
    assert!(note.message.contains("3 days in a row"));
}

#[test]
fn test_gap_resets_and_same_day_is_ignored() {
    let entries = vec![
        entry(1, &[("neck", Some(3))]),
        entry(2, &[("neck", Some(3))]),
        entry(2, &[("neck", Some(9))]),
        entry(4, &[("neck", Some(3))]),
        entry(5, &[("neck", Some(3))]),
    ];
    assert!(PainPatternDetector::consecutive_pain_streaks(&entries).is_empty());
    assert!(PainPatternDetector::fascia_notification(&entries).is_none());
}

#[test]
fn test_longest_streak_leads() {
    let mut entries: Vec<PainLogEntry> = (1..=4).map(|d| entry(d, &[("glutes", Some(2))])).collect();
    entries.extend((1..=3).map(|d| entry(d, &[("left-calf", Some(7))])));

    let streaks = PainPatternDetector::consecutive_pain_streaks(&entries);
    assert_eq!(streaks.len(), 2);
    assert_eq!(streaks[0].area, "glutes");
    assert_eq!(streaks[0].days, 4);
    assert_eq!(
        PainPatternDetector::fascia_notification(&entries)
            .unwrap()
            .area,
        "glutes"
    );
}

#[test]
fn test_cns_scoring_bands() {
    assert!((CnsTest::score(200.0) - 100.0).abs() < f64::EPSILON);
    assert!((CnsTest::score(300.0) - 75.0).abs() < f64::EPSILON);
    assert!(CnsTest::score(650.0).abs() < f64::EPSILON);

    let result = CnsTest::evaluate(&[180.0, 220.0, 200.0]).unwrap();
    assert_eq!(result.taps, 3);
    assert!((result.average_ms - 200.0).abs() < f64::EPSILON);
    assert!((result.best_ms - 180.0).abs() < f64::EPSILON);
    assert_eq!(result.readiness, CnsReadiness::Primed);

    let slow = CnsTest::evaluate(&[420.0]).unwrap();
    assert_eq!(slow.readiness, CnsReadiness::Fatigued);
}

#[test]
fn test_cns_rejects_bad_taps() {
    assert_eq!(CnsTest::evaluate(&[]).unwrap_err().code, ErrorCode::InvalidInput);
    assert_eq!(
        CnsTest::evaluate(&[200.0, -5.0]).unwrap_err().code,
        ErrorCode::InvalidInput
    );
}

#[test]
fn test_balance_asymmetry() {
    let even = BalanceTest::analyze(0.0, 0.0).unwrap();
    assert_eq!(even.stronger_side, StrongerSide::Even);
    assert!(even.percent_diff.abs() < f64::EPSILON);
    assert!(!even.significant);

    let lopsided = BalanceTest::analyze(20.0, 40.0).unwrap();
    assert_eq!(lopsided.stronger_side, StrongerSide::Right);
    assert!((lopsided.percent_diff - 50.0).abs() < f64::EPSILON);
    assert!(lopsided.significant);

    let mild = BalanceTest::analyze(50.0, 41.0).unwrap();
    assert_eq!(mild.stronger_side, StrongerSide::Left);
    assert!((mild.percent_diff - 18.0).abs() < 1e-9);
    assert!(!mild.significant);

    assert_eq!(
        BalanceTest::analyze(-1.0, 10.0).unwrap_err().code,
        ErrorCode::InvalidInput
    );
}

#[test]
fn test_balance_exactly_at_threshold_is_not_significant() {
    let boundary = BalanceTest::analyze(40.0, 50.0).unwrap();
    assert_eq!(boundary.stronger_side, StrongerSide::Right);
    assert!((boundary.percent_diff - 20.0).abs() < 1e-9);
    assert!(!boundary.significant);

    // 34.4 / 43 lands a hair above 20 in floating point
    let rounded = BalanceTest::analyze(43.0, 34.4).unwrap();
    assert!((rounded.percent_diff - 20.0).abs() < 1e-9);
    assert!(!rounded.significant);

    let just_over = BalanceTest::analyze(40.0, 50.5).unwrap();
    assert!(just_over.significant);
}
