// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Biometric snapshots and derived energy metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::coerce;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "hombre")]
    Male,
    #[serde(alias = "mujer")]
    Female,
}

/// Derived values for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthMetrics {
    /// kg / m², two decimals
    pub bmi: f64,
    /// Mifflin-St Jeor, whole kcal
    pub bmr: f64,
    /// BMR scaled by activity, whole kcal
    pub tdee: f64,
}

impl HealthMetrics {
    pub fn compute(weight_kg: f64, height_cm: u32, age: u32, gender: Gender, activity: f64) -> Self {
        let height = f64::from(height_cm);
        let meters = height / 100.0;
        let bmi = weight_kg / (meters * meters);

        let base = 10.0 * weight_kg + 6.25 * height - 5.0 * f64::from(age);
        let bmr = match gender {
            Gender::Male => base + 5.0,
            Gender::Female => base - 161.0,
        };

        Self {
            bmi: (bmi * 100.0).round() / 100.0,
            bmr: bmr.round(),
            tdee: (bmr * activity).round(),
        }
    }
}

/// Snapshot stored in the `health_snapshots` collection. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthSnapshot {
    pub id: String,
    pub user_id: String,
    pub weight: f64,
    pub height: u32,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: f64,
    pub bmi: f64,
    pub bmr: f64,
    pub tdee: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewHealthSnapshot {
    #[serde(deserialize_with = "coerce::number")]
    #[validate(range(min = 20.0, max = 300.0, message = "Weight must be between 20 and 300 kg"))]
    pub weight: f64,
    #[serde(deserialize_with = "coerce::integer")]
    #[validate(range(min = 100, max = 250, message = "Height must be between 100 and 250 cm"))]
    pub height: u32,
    #[serde(deserialize_with = "coerce::integer")]
    #[validate(range(min = 14, max = 100, message = "Age must be between 14 and 100"))]
    pub age: u32,
    pub gender: Gender,
    #[serde(deserialize_with = "coerce::number")]
    #[validate(range(
        min = 1.2,
        max = 2.5,
        message = "Activity level must be between 1.2 and 2.5"
    ))]
    pub activity_level: f64,
}

impl NewHealthSnapshot {
    pub fn into_snapshot(self, id: String, user_id: String, now: DateTime<Utc>) -> HealthSnapshot {
        let metrics = HealthMetrics::compute(
            self.weight,
            self.height,
            self.age,
            self.gender,
            self.activity_level,
        );
        HealthSnapshot {
            id,
            user_id,
            weight: self.weight,
            height: self.height,
            age: self.age,
            gender: self.gender,
            activity_level: self.activity_level,
            bmi: metrics.bmi,
            bmr: metrics.bmr,
            tdee: metrics.tdee,
            created_at: now,
        }
    }
}
