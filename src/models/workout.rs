// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::coerce;

pub const DEFAULT_ROUTINE_NAME: &str = "Untitled workout";

/// Workout session stored in the `workouts` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub routine_name: String,
    /// When the session took place
    pub date: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub muscle_group: String,
    pub exercise_name: String,
    pub sets: Vec<WorkoutSet>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSet {
    pub reps: u32,
    /// Zero for bodyweight work
    pub weight: f64,
}

impl WorkoutSet {
    /// Tonnage moved in this set.
    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight
    }
}

// ─── Request Contracts ───────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewWorkout {
    #[serde(default, deserialize_with = "coerce::optional_trimmed")]
    #[validate(length(max = 100, message = "Routine name must be at most 100 characters"))]
    pub routine_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_date")]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "At least one exercise is required"), nested)]
    pub exercises: Vec<NewExercise>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewExercise {
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(length(min = 1, max = 50, message = "Muscle group is required"))]
    pub muscle_group: String,
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(length(min = 1, max = 100, message = "Exercise name is required"))]
    pub exercise_name: String,
    #[validate(length(min = 1, message = "At least one set is required"), nested)]
    pub sets: Vec<NewSet>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewSet {
    #[serde(deserialize_with = "coerce::integer")]
    #[validate(range(min = 1, message = "Reps must be at least 1"))]
    pub reps: u32,
    #[serde(default, deserialize_with = "coerce::number")]
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    pub weight: f64,
}

impl NewWorkout {
    /// Build the stored session for `user_id`.
    pub fn into_workout(self, id: String, user_id: String, now: DateTime<Utc>) -> Workout {
        Workout {
            id,
            user_id,
            routine_name: self
                .routine_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_ROUTINE_NAME.to_string()),
            date: self.date.unwrap_or(now),
            exercises: self
                .exercises
                .into_iter()
                .map(|exercise| Exercise {
                    muscle_group: exercise.muscle_group,
                    exercise_name: exercise.exercise_name,
                    sets: exercise
                        .sets
                        .into_iter()
                        .map(|set| WorkoutSet {
                            reps: set.reps,
                            weight: set.weight,
                        })
                        .collect(),
                })
                .collect(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_volume() {
        assert_eq!(WorkoutSet { reps: 10, weight: 50.0 }.volume(), 500.0);
        assert_eq!(WorkoutSet { reps: 12, weight: 0.0 }.volume(), 0.0);
    }

    #[test]
    fn test_defaults_applied() {
        let input: NewWorkout = serde_json::from_value(serde_json::json!({
            "routine_name": "   ",
            "exercises": [{
                "muscle_group": "Pecho",
                "exercise_name": "Flexiones de Brazos",
                "sets": [{ "reps": "15" }]
            }]
        }))
        .unwrap();
        assert!(input.validate().is_ok());

        let now = Utc::now();
        let workout = input.into_workout("w1".into(), "u1".into(), now);
        assert_eq!(workout.routine_name, DEFAULT_ROUTINE_NAME);
        assert_eq!(workout.date, now);
        assert_eq!(workout.exercises[0].sets[0].weight, 0.0);
    }

    #[test]
    fn test_exercise_without_sets_is_invalid() {
        let input: NewWorkout = serde_json::from_value(serde_json::json!({
            "exercises": [{
                "muscle_group": "Pecho",
                "exercise_name": "Flexiones de Brazos",
                "sets": []
            }]
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }
}
