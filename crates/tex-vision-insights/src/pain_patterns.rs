// ABOUTME: Detects body areas logged with pain on consecutive calendar days
// ABOUTME: Builds a fascia (body line) notification for the longest qualifying streak
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tex_vision_core::body_map::{self, FasciaLine};
use tex_vision_core::constants::pain::CONSECUTIVE_DAYS_THRESHOLD;
use tex_vision_core::models::PainLogEntry;
use tracing::debug;

/// A run of consecutive pain days for one area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainStreak {
    /// Body area id
    pub area: String,
    /// Consecutive calendar days in the run
    pub days: u32,
    /// First day of the run
    pub start_date: NaiveDate,
    /// Last day of the run
    pub end_date: NaiveDate,
    /// Mean severity over days that carried a score, 0 when none did
    pub average_severity: f64,
}

/// Educational message shown when pain keeps recurring in one area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FasciaNotification {
    /// Area that triggered the notification
    pub area: String,
    /// Display label of the area
    pub area_label: String,
    /// Streak that triggered it
    pub streak: PainStreak,
    /// Body lines passing through the area
    pub lines: Vec<FasciaLineSummary>,
    /// Areas connected through those lines
    pub connected_areas: Vec<String>,
    /// Headline text
    pub message: String,
}

/// Body line text attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FasciaLineSummary {
    /// Line id
    pub id: String,
    /// Line name
    pub name: String,
    /// Explanation
    pub description: String,
    /// Mobility suggestion
    pub suggestion: String,
}

impl From<&FasciaLine> for FasciaLineSummary {
    fn from(line: &FasciaLine) -> Self {
        Self {
            id: line.id.to_owned(),
            name: line.name.to_owned(),
            description: line.description.to_owned(),
            suggestion: line.suggestion.to_owned(),
        }
    }
}

/// Running streak state for one area
struct StreakState {
    start: NaiveDate,
    last: NaiveDate,
    days: u32,
    severities: Vec<u8>,
}

impl StreakState {
    fn begin(date: NaiveDate, severity: Option<u8>) -> Self {
        Self {
            start: date,
            last: date,
            days: 1,
            severities: severity.into_iter().collect(),
        }
    }

    fn to_streak(&self, area: &str) -> PainStreak {
        let average_severity = if self.severities.is_empty() {
            0.0
        } else {
            let sum: f64 = self.severities.iter().map(|s| f64::from(*s)).sum();
            sum / self.severities.len() as f64
        };
        PainStreak {
            area: area.to_owned(),
            days: self.days,
            start_date: self.start,
            end_date: self.last,
            average_severity,
        }
    }
}

/// Pain pattern detection engine
pub struct PainPatternDetector;

impl PainPatternDetector {
    /// Longest consecutive-day streak per area, reported when it reaches the threshold
    ///
    /// Rows are sorted by date first. A second row on the same day neither extends nor
    /// resets a streak; any gap other than exactly one day restarts it at 1.
    #[must_use]
    pub fn consecutive_pain_streaks(entries: &[PainLogEntry]) -> Vec<PainStreak> {
        let mut sorted: Vec<&PainLogEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| e.entry_date);

        let mut current: BTreeMap<String, StreakState> = BTreeMap::new();
        let mut best: BTreeMap<String, PainStreak> = BTreeMap::new();

        for entry in sorted {
            for area in entry.areas() {
                let severity = entry.pain_scales.get(area).copied();
                let date = entry.entry_date;
                if let Some(state) = current.get_mut(area) {
                    match (date - state.last).num_days() {
                        0 => {}
                        1 => {
                            state.last = date;
                            state.days += 1;
                            state.severities.extend(severity);
                        }
                        _ => *state = StreakState::begin(date, severity),
                    }
                } else {
                    current.insert(area.to_owned(), StreakState::begin(date, severity));
                }
                let Some(state) = current.get(area) else {
                    continue;
                };

                if state.days >= CONSECUTIVE_DAYS_THRESHOLD
                    && !best.get(area).is_some_and(|b| b.days >= state.days)
                {
                    best.insert(area.to_owned(), state.to_streak(area));
                }
            }
        }

        let mut streaks: Vec<PainStreak> = best.into_values().collect();
        streaks.sort_by(|a, b| b.days.cmp(&a.days).then_with(|| a.area.cmp(&b.area)));
        debug!(streaks = streaks.len(), "Consecutive pain scan complete");
        streaks
    }

    /// Notification for the strongest streak, `None` when nothing qualifies
    #[must_use]
    pub fn fascia_notification(entries: &[PainLogEntry]) -> Option<FasciaNotification> {
        Self::consecutive_pain_streaks(entries)
            .into_iter()
            .next()
            .map(Self::notification_for)
    }

    /// Build the notification for one streak using the body-line tables
    #[must_use]
    pub fn notification_for(streak: PainStreak) -> FasciaNotification {
        let label = body_map::area_label(&streak.area)
            .unwrap_or(streak.area.as_str())
            .to_owned();
        let lines: Vec<FasciaLineSummary> = body_map::lines_for_area(&streak.area)
            .map(FasciaLineSummary::from)
            .collect();
        let connected_areas = body_map::connected_areas(&streak.area)
            .into_iter()
            .map(str::to_owned)
            .collect();
        let message = format!(
            "{label} pain logged {} days in a row (average severity {:.1}). Pain that keeps \
             returning in one spot can travel along connected tissue.",
            streak.days, streak.average_severity
        );

        FasciaNotification {
            area: streak.area.clone(),
            area_label: label,
            streak,
            lines,
            connected_areas,
            message,
        }
    }
}
