// ABOUTME: Coach grade overrides and weight log rows
// ABOUTME: Request types validate their own fields before they reach a repository
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coach correction of an automatically assigned session grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachOverride {
    /// Row id
    pub id: Uuid,
    /// Athlete the graded session belongs to
    pub user_id: Uuid,
    /// Graded session
    pub session_id: Uuid,
    /// Coach making the override
    pub coach_id: Uuid,
    /// Grade before the override
    pub original_grade: String,
    /// Grade after the override
    pub override_grade: String,
    /// Why the coach changed it
    pub override_reason: Option<String>,
    /// Insert time
    pub created_at: DateTime<Utc>,
}

/// Request to record a coach override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoachOverride {
    /// Graded session
    pub session_id: Uuid,
    /// Coach making the override
    pub coach_id: Uuid,
    /// Grade before the override
    pub original_grade: String,
    /// Grade after the override
    pub override_grade: String,
    /// Why the coach changed it
    #[serde(default)]
    pub override_reason: Option<String>,
}

impl NewCoachOverride {
    /// Reject blank grades
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when either grade is empty
    pub fn validate(&self) -> AppResult<()> {
        if self.original_grade.trim().is_empty() || self.override_grade.trim().is_empty() {
            return Err(AppError::invalid_input("Grades cannot be empty"));
        }
        Ok(())
    }
}

/// One body-weight measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Row id
    pub id: Uuid,
    /// Owning athlete
    pub user_id: Uuid,
    /// Day of the measurement
    pub entry_date: NaiveDate,
    /// Weight in pounds
    pub weight_lbs: f64,
    /// Insert time
    pub created_at: DateTime<Utc>,
}

/// Request to log a weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWeightEntry {
    /// Day of the measurement
    pub entry_date: NaiveDate,
    /// Weight in pounds
    pub weight_lbs: f64,
}

impl NewWeightEntry {
    /// Reject non-positive or implausible weights
    ///
    /// # Errors
    ///
    /// Returns `ValueOutOfRange` when the weight is not in (0, 1000) lbs
    pub fn validate(&self) -> AppResult<()> {
        if !self.weight_lbs.is_finite() || self.weight_lbs <= 0.0 || self.weight_lbs >= 1000.0 {
            return Err(AppError::out_of_range(format!(
                "Weight {} lbs is outside the accepted range",
                self.weight_lbs
            )));
        }
        Ok(())
    }
}
