// ABOUTME: Static post-drill reflection questions and the answers collected for them
// ABOUTME: Drills without questions go straight from play to the conclusion screen
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tex_vision_core::errors::{AppError, AppResult};
use tex_vision_core::models::DrillId;

/// One reflection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionQuestion {
    /// Stable key for the answer
    pub id: &'static str,
    /// Prompt text
    pub prompt: &'static str,
    /// Choices; empty for free text
    pub options: &'static [&'static str],
}

const FEEL: ReflectionQuestion = ReflectionQuestion {
    id: "feel",
    prompt: "How did that drill feel?",
    options: &["easy", "just right", "hard"],
};

const FOCUS: ReflectionQuestion = ReflectionQuestion {
    id: "focus",
    prompt: "Where was your focus?",
    options: &["centre", "edges", "all over"],
};

const STRATEGY: ReflectionQuestion = ReflectionQuestion {
    id: "strategy",
    prompt: "What helped you most?",
    options: &[],
};

const TIMING: ReflectionQuestion = ReflectionQuestion {
    id: "timing",
    prompt: "Were your taps mostly early or late?",
    options: &["early", "on time", "late"],
};

const IMPULSE: ReflectionQuestion = ReflectionQuestion {
    id: "impulse",
    prompt: "Did you catch yourself before tapping on the wrong signal?",
    options: &["always", "sometimes", "rarely"],
};

/// Questions registered for a drill, empty when it has none
#[must_use]
pub const fn reflection_questions(drill: DrillId) -> &'static [ReflectionQuestion] {
    match drill {
        DrillId::ColorFlash => &[FEEL, STRATEGY],
        DrillId::GoNoGo => &[FEEL, IMPULSE],
        DrillId::PeripheralFlash | DrillId::SplitAttention => &[FEEL, FOCUS],
        DrillId::MultipleObjectTracking => &[FEEL, FOCUS, STRATEGY],
        DrillId::SequenceRecall => &[FEEL, STRATEGY],
        DrillId::AnticipationTiming => &[FEEL, TIMING],
        _ => &[],
    }
}

/// Answers keyed by question id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionAnswers(pub BTreeMap<String, String>);

impl ReflectionAnswers {
    /// Keep only answers to the drill's questions and check choice answers
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an answer that is not one of the question's options
    pub fn validated(drill: DrillId, raw: BTreeMap<String, String>) -> AppResult<Self> {
        let mut answers = BTreeMap::new();
        for question in reflection_questions(drill) {
            let Some(answer) = raw.get(question.id) else {
                continue;
            };
            let answer = answer.trim();
            if answer.is_empty() {
                continue;
            }
            if !question.options.is_empty() && !question.options.iter().any(|o| *o == answer) {
                return Err(AppError::invalid_input(format!(
                    "'{answer}' is not an option for '{}'",
                    question.id
                )));
            }
            answers.insert(question.id.to_owned(), answer.to_owned());
        }
        Ok(Self(answers))
    }

    /// No answers given
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
