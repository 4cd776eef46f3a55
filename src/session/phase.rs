// ABOUTME: Session phases and the events that move a session between them
// ABOUTME: Events deserialize from tagged JSON so the HTTP layer can forward them unchanged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::drills::DrillInput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// How-to screen
    Instructions,
    /// 3-2-1 before play
    Countdown,
    /// Drill running
    Playing,
    /// Optional post-drill questions
    Reflection,
    /// Rest between attempts
    Break,
    /// Result screen
    Conclusion,
    /// Session over, no further events accepted
    Finished,
}

impl Phase {
    /// Wire representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instructions => "instructions",
            Self::Countdown => "countdown",
            Self::Playing => "playing",
            Self::Reflection => "reflection",
            Self::Break => "break",
            Self::Conclusion => "conclusion",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that happened to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Leave the instructions
    Start,
    /// Skip the instructions for a drill already played
    SkipTutorial,
    /// Time passed
    Tick {
        /// Elapsed milliseconds since the previous tick
        dt_ms: u64,
    },
    /// A drill input
    Input {
        /// The input
        input: DrillInput,
    },
    /// The drill's duration timer ran out
    DurationElapsed,
    /// Reflection answers
    SubmitReflection {
        /// Answers keyed by question id
        answers: BTreeMap<String, String>,
    },
    /// Skip reflection
    SkipReflection,
    /// Finish and hand the result to the caller
    Done,
    /// Play the drill again
    Retry,
    /// Rest before the next attempt
    TakeBreak,
    /// End a break early
    SkipBreak,
    /// Leave without a result
    Exit,
}

impl SessionEvent {
    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SkipTutorial => "skip_tutorial",
            Self::Tick { .. } => "tick",
            Self::Input { .. } => "input",
            Self::DurationElapsed => "duration_elapsed",
            Self::SubmitReflection { .. } => "submit_reflection",
            Self::SkipReflection => "skip_reflection",
            Self::Done => "done",
            Self::Retry => "retry",
            Self::TakeBreak => "take_break",
            Self::SkipBreak => "skip_break",
            Self::Exit => "exit",
        }
    }
}
