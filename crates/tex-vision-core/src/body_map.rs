// ABOUTME: Static body-area labels and fascia (body line) reference content
// ABOUTME: Read-only lookup tables used by the pain map, heat-map and pattern insight
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Body map reference tables
//!
//! Areas are identified by kebab-case ids (`lower-back`, `left-knee`, ...).
//! Each fascia line lists the areas it connects plus a short educational
//! explanation shown when pain keeps recurring along that line.

use serde::Serialize;

/// A selectable region on the pain map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyArea {
    /// Stable id stored in `pain_location` / `pain_scales`
    pub id: &'static str,
    /// Display label
    pub label: &'static str,
}

/// A named chain of connective tissue running through several areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FasciaLine {
    /// Stable id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Areas along this line
    pub areas: &'static [&'static str],
    /// What the athlete should know when pain repeats here
    pub description: &'static str,
    /// Suggested mobility focus
    pub suggestion: &'static str,
}

const fn area(id: &'static str, label: &'static str) -> BodyArea {
    BodyArea { id, label }
}

/// Every area on the pain map
pub const BODY_AREAS: &[BodyArea] = &[
    area("head", "Head"),
    area("neck", "Neck"),
    area("left-shoulder", "Left Shoulder"),
    area("right-shoulder", "Right Shoulder"),
    area("upper-back", "Upper Back"),
    area("chest", "Chest"),
    area("left-elbow", "Left Elbow"),
    area("right-elbow", "Right Elbow"),
    area("left-wrist", "Left Wrist"),
    area("right-wrist", "Right Wrist"),
    area("abdomen", "Abdomen"),
    area("lower-back", "Lower Back"),
    area("left-hip", "Left Hip"),
    area("right-hip", "Right Hip"),
    area("glutes", "Glutes"),
    area("left-hamstring", "Left Hamstring"),
    area("right-hamstring", "Right Hamstring"),
    area("left-quad", "Left Quad"),
    area("right-quad", "Right Quad"),
    area("left-knee", "Left Knee"),
    area("right-knee", "Right Knee"),
    area("left-calf", "Left Calf"),
    area("right-calf", "Right Calf"),
    area("left-ankle", "Left Ankle"),
    area("right-ankle", "Right Ankle"),
    area("left-foot", "Left Foot"),
    area("right-foot", "Right Foot"),
];

/// Fascia lines in the order they are checked
pub const FASCIA_LINES: &[FasciaLine] = &[
    FasciaLine {
        id: "superficial-back-line",
        name: "Superficial Back Line",
        areas: &[
            "left-foot",
            "right-foot",
            "left-calf",
            "right-calf",
            "left-hamstring",
            "right-hamstring",
            "glutes",
            "lower-back",
            "upper-back",
            "neck",
            "head",
        ],
        description: "Runs from the soles of the feet up the back of the legs and spine to the \
                      head. Tightness anywhere along it often shows up somewhere else on the line.",
        suggestion: "Roll the feet and calves, then stretch the hamstrings before loading the back.",
    },
    FasciaLine {
        id: "superficial-front-line",
        name: "Superficial Front Line",
        areas: &[
            "left-foot",
            "right-foot",
            "left-ankle",
            "right-ankle",
            "left-quad",
            "right-quad",
            "left-knee",
            "right-knee",
            "abdomen",
            "chest",
            "neck",
        ],
        description: "Connects the top of the feet through the shins, quads and abdomen to the \
                      front of the neck. It balances the pull of the back line.",
        suggestion: "Open the hip flexors and quads and work on ankle dorsiflexion.",
    },
    FasciaLine {
        id: "lateral-line",
        name: "Lateral Line",
        areas: &[
            "left-ankle",
            "right-ankle",
            "left-knee",
            "right-knee",
            "left-hip",
            "right-hip",
            "left-shoulder",
            "right-shoulder",
            "neck",
        ],
        description: "Travels up the outside of each leg, along the ribs and into the neck. It \
                      stabilises side-to-side movement and single-leg balance.",
        suggestion: "Add side planks and lateral band walks, and check single-leg balance.",
    },
    FasciaLine {
        id: "spiral-line",
        name: "Spiral Line",
        areas: &[
            "left-foot",
            "right-foot",
            "left-knee",
            "right-knee",
            "left-hip",
            "right-hip",
            "abdomen",
            "upper-back",
            "left-shoulder",
            "right-shoulder",
            "head",
        ],
        description: "Wraps around the body in a double helix from the skull to the arches of the \
                      feet. Rotation and twisting loads travel along it.",
        suggestion: "Train anti-rotation core work and mobilise the thoracic spine.",
    },
    FasciaLine {
        id: "deep-front-line",
        name: "Deep Front Line",
        areas: &[
            "left-foot",
            "right-foot",
            "left-calf",
            "right-calf",
            "left-knee",
            "right-knee",
            "left-hip",
            "right-hip",
            "lower-back",
            "abdomen",
            "neck",
        ],
        description: "The body's core line, running from the inner arch through the adductors, hip \
                      flexors and diaphragm to the jaw. It supports posture and breathing.",
        suggestion: "Practice diaphragmatic breathing and adductor mobility.",
    },
    FasciaLine {
        id: "arm-lines",
        name: "Arm Lines",
        areas: &[
            "chest",
            "upper-back",
            "left-shoulder",
            "right-shoulder",
            "left-elbow",
            "right-elbow",
            "left-wrist",
            "right-wrist",
        ],
        description: "Four lines linking the chest and upper back to the fingertips. Grip and \
                      pressing strain often travels between the wrist, elbow and shoulder.",
        suggestion: "Stretch the pecs and forearms and balance pressing with pulling.",
    },
];

/// Display label for an area id, `None` when the id is unknown
#[must_use]
pub fn area_label(id: &str) -> Option<&'static str> {
    BODY_AREAS.iter().find(|a| a.id == id).map(|a| a.label)
}

/// Whether the id names an area on the pain map
#[must_use]
pub fn is_known_area(id: &str) -> bool {
    area_label(id).is_some()
}

/// Fascia lines that pass through an area
pub fn lines_for_area(id: &str) -> impl Iterator<Item = &'static FasciaLine> + '_ {
    FASCIA_LINES
        .iter()
        .filter(move |line| line.areas.iter().any(|area| *area == id))
}

/// Areas connected to `id` through any fascia line, excluding `id` itself
#[must_use]
pub fn connected_areas(id: &str) -> Vec<&'static str> {
    let mut connected: Vec<&'static str> = lines_for_area(id)
        .flat_map(|line| line.areas.iter().copied())
        .filter(|other| *other != id)
        .collect();
    connected.sort_unstable();
    connected.dedup();
    connected
}
