// ABOUTME: Aggregates wellness quiz rows into per-body-area pain frequency
// ABOUTME: Buckets each area into None/Occasional/Moderate/Frequent/Chronic for the heat-map
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tex_vision_core::body_map;
use tex_vision_core::models::PainLogEntry;

/// How often an area shows up in the pain log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PainIntensity {
    /// Never logged
    None,
    /// 1-2 entries
    Occasional,
    /// 3-5 entries
    Moderate,
    /// 6-9 entries
    Frequent,
    /// 10 or more entries
    Chronic,
}

impl PainIntensity {
    /// Bucket for a frequency count
    #[must_use]
    pub const fn from_frequency(count: u32) -> Self {
        match count {
            0 => Self::None,
            1..=2 => Self::Occasional,
            3..=5 => Self::Moderate,
            6..=9 => Self::Frequent,
            _ => Self::Chronic,
        }
    }
}

/// Heat for a single area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaHeat {
    /// Body area id
    pub area: String,
    /// Display label, the id itself for areas missing from the body map
    pub label: String,
    /// Entries that logged this area
    pub frequency: u32,
    /// Bucketed frequency
    pub intensity: PainIntensity,
    /// Mean severity over entries that scored the area
    pub average_severity: Option<f64>,
}

/// Heat-map over a window of quiz rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainHeatmap {
    /// Rows considered
    pub entries_analyzed: usize,
    /// Every body-map area plus any unknown areas that were logged, sorted by id
    pub areas: Vec<AreaHeat>,
}

impl PainHeatmap {
    /// Build the heat-map from quiz rows
    ///
    /// An area counts once per row even when listed and scored.
    #[must_use]
    pub fn build(entries: &[PainLogEntry]) -> Self {
        let mut frequency: BTreeMap<String, u32> = body_map::BODY_AREAS
            .iter()
            .map(|a| (a.id.to_owned(), 0))
            .collect();
        let mut severities: BTreeMap<String, Vec<u8>> = BTreeMap::new();

        for entry in entries {
            for area in entry.areas() {
                *frequency.entry(area.to_owned()).or_insert(0) += 1;
                if let Some(level) = entry.pain_scales.get(area) {
                    severities.entry(area.to_owned()).or_default().push(*level);
                }
            }
        }

        let areas = frequency
            .into_iter()
            .map(|(area, count)| {
                let average_severity = severities.get(&area).map(|levels| {
                    let sum: f64 = levels.iter().map(|l| f64::from(*l)).sum();
                    sum / levels.len() as f64
                });
                AreaHeat {
                    label: body_map::area_label(&area).unwrap_or(area.as_str()).to_owned(),
                    intensity: PainIntensity::from_frequency(count),
                    frequency: count,
                    average_severity,
                    area,
                }
            })
            .collect();

        Self {
            entries_analyzed: entries.len(),
            areas,
        }
    }

    /// Heat for one area
    #[must_use]
    pub fn area(&self, id: &str) -> Option<&AreaHeat> {
        self.areas.iter().find(|a| a.area == id)
    }

    /// Areas logged at least once, most frequent first
    #[must_use]
    pub fn hotspots(&self) -> Vec<&AreaHeat> {
        let mut hot: Vec<&AreaHeat> = self.areas.iter().filter(|a| a.frequency > 0).collect();
        hot.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.area.cmp(&b.area)));
        hot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(day: u32, areas: &[(&str, u8)]) -> PainLogEntry {
        PainLogEntry {
            entry_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            pain_location: areas.iter().map(|(a, _)| (*a).to_owned()).collect(),
            pain_scales: areas.iter().map(|(a, l)| ((*a).to_owned(), *l)).collect(),
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(PainIntensity::from_frequency(0), PainIntensity::None);
        assert_eq!(PainIntensity::from_frequency(2), PainIntensity::Occasional);
        assert_eq!(PainIntensity::from_frequency(3), PainIntensity::Moderate);
        assert_eq!(PainIntensity::from_frequency(5), PainIntensity::Moderate);
        assert_eq!(PainIntensity::from_frequency(6), PainIntensity::Frequent);
        assert_eq!(PainIntensity::from_frequency(9), PainIntensity::Frequent);
        assert_eq!(PainIntensity::from_frequency(10), PainIntensity::Chronic);
    }

    #[test]
    fn test_unknown_area_keeps_its_id_as_label() {
        let map = PainHeatmap::build(&[entry(1, &[("tailbone", 4)])]);
        let heat = map.area("tailbone").unwrap();
        assert_eq!(heat.label, "tailbone");
        assert_eq!(heat.frequency, 1);
        assert_eq!(map.area("neck").unwrap().intensity, PainIntensity::None);
    }
}
