// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strength records and one-rep-max estimation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

use crate::models::catalog::{muscle_group_of, validate_exercise_name, validate_muscle_group};
use crate::validation::coerce;

/// Highest rep count accepted for an estimate. Brzycki diverges near 37.
pub const MAX_REPS: u32 = 20;
/// Heaviest accepted working weight (kg).
pub const MAX_WEIGHT: f64 = 600.0;

/// Both 1RM estimates for one working set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneRepMax {
    pub epley: f64,
    pub brzycki: f64,
}

impl OneRepMax {
    /// Estimate the one-rep max from a set of `reps` at `weight`.
    ///
    /// Returns `None` outside `weight > 0`, `1 <= reps <= MAX_REPS`.
    pub fn estimate(weight: f64, reps: u32) -> Option<Self> {
        if !weight.is_finite() || weight <= 0.0 || reps == 0 || reps > MAX_REPS {
            return None;
        }
        let r = f64::from(reps);
        Some(Self {
            epley: weight * (1.0 + r / 30.0),
            brzycki: weight / (1.0278 - 0.0278 * r),
        })
    }
}

/// Strength record stored in the `records` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StrengthRecord {
    pub id: String,
    pub user_id: String,
    pub exercise_name: String,
    pub muscle_group: String,
    pub weight_used: f64,
    pub reps_done: u32,
    pub epley_result: f64,
    pub brzycki_result: f64,
    /// Whether this beat the owner's prior best for the same exercise when saved
    pub is_personal_record: bool,
    /// When the set was performed
    pub achieved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Record submission. 1RM results are always computed server-side.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "exercise_matches_group"))]
pub struct NewRecord {
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(custom(function = "validate_exercise_name"))]
    pub exercise_name: String,
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(custom(function = "validate_muscle_group"))]
    pub muscle_group: String,
    #[serde(deserialize_with = "coerce::number")]
    #[validate(range(
        exclusive_min = 0.0,
        max = 600.0,
        message = "Weight must be greater than 0 and at most 600"
    ))]
    pub weight_used: f64,
    #[serde(deserialize_with = "coerce::integer")]
    #[validate(range(min = 1, max = 20, message = "Reps must be between 1 and 20"))]
    pub reps_done: u32,
    #[serde(default, deserialize_with = "coerce::optional_date")]
    #[validate(custom(function = "coerce::not_in_future"))]
    pub date: Option<DateTime<Utc>>,
}

fn exercise_matches_group(record: &NewRecord) -> Result<(), ValidationError> {
    match muscle_group_of(&record.exercise_name) {
        Some(group) if group != record.muscle_group => Err(ValidationError::new("muscle_group")
            .with_message("Exercise does not belong to the given muscle group".into())),
        _ => Ok(()),
    }
}
