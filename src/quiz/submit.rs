// ABOUTME: Async submitter seam between the quiz form and persistence
// ABOUTME: RepositorySubmitter validates and stores a payload for one user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::database::WellnessRepository;
use crate::logging::AppLogger;
use async_trait::async_trait;
use std::sync::Arc;
use tex_vision_core::errors::AppResult;
use tex_vision_core::models::{WellnessQuizPayload, WellnessQuizRecord};
use uuid::Uuid;

/// Receives a finished quiz payload
#[async_trait]
pub trait QuizSubmitter: Send + Sync {
    /// Store the payload and return the persisted row
    async fn submit(&self, payload: WellnessQuizPayload) -> AppResult<WellnessQuizRecord>;
}

/// Submits into a [`WellnessRepository`] on behalf of one user
#[derive(Clone)]
pub struct RepositorySubmitter {
    repository: Arc<dyn WellnessRepository>,
    user_id: Uuid,
}

impl RepositorySubmitter {
    /// Submitter for `user_id`
    #[must_use]
    pub fn new(repository: Arc<dyn WellnessRepository>, user_id: Uuid) -> Self {
        Self {
            repository,
            user_id,
        }
    }
}

#[async_trait]
impl QuizSubmitter for RepositorySubmitter {
    async fn submit(&self, payload: WellnessQuizPayload) -> AppResult<WellnessQuizRecord> {
        payload.validate()?;
        let quiz_type = payload.quiz_type;
        let result = self.repository.insert_quiz(self.user_id, payload).await;
        AppLogger::log_quiz_submission(
            &self.user_id.to_string(),
            quiz_type.as_str(),
            result.is_ok(),
        );
        result
    }
}
