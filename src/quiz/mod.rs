// ABOUTME: Wellness check-in quizzes: form state, payload assembly and submission
// ABOUTME: Three quiz types share one form that only emits the active type's sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

/// Form state and payload assembly
pub mod form;

/// Submitters that persist a finished payload
pub mod submit;

pub use form::{QuizForm, QuizTemplate, RatingField};
pub use submit::{QuizSubmitter, RepositorySubmitter};
