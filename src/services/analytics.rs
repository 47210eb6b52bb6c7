// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout aggregates: muscle distribution, volume over time, total tonnage.
//!
//! All three flatten every set of every exercise of every session. Grouping
//! uses `BTreeMap` so output order is stable without a separate sort.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::Database;
use crate::error::AppError;
use crate::models::Workout;
use crate::time_utils::day_key;

/// Reps logged for one muscle group.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MuscleShare {
    pub muscle_group: String,
    pub total_reps: u64,
}

/// Volume for one (day, muscle group, exercise) bucket.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VolumePoint {
    /// UTC day, `YYYY-MM-DD`
    pub date: String,
    pub muscle_group: String,
    pub exercise_name: String,
    pub volume: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkoutStats {
    pub muscle_distribution: Vec<MuscleShare>,
    pub volume_progress: Vec<VolumePoint>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TotalVolume {
    pub total_volume: f64,
}

pub fn muscle_distribution(workouts: &[Workout]) -> Vec<MuscleShare> {
    let mut reps: BTreeMap<&str, u64> = BTreeMap::new();
    for exercise in workouts.iter().flat_map(|w| &w.exercises) {
        let total: u64 = exercise.sets.iter().map(|s| u64::from(s.reps)).sum();
        *reps.entry(exercise.muscle_group.as_str()).or_default() += total;
    }
    reps.into_iter()
        .map(|(group, total_reps)| MuscleShare {
            muscle_group: group.to_string(),
            total_reps,
        })
        .collect()
}

/// Date ascending, then muscle group, then exercise name.
pub fn volume_progress(workouts: &[Workout]) -> Vec<VolumePoint> {
    let mut buckets: BTreeMap<(String, &str, &str), f64> = BTreeMap::new();
    for workout in workouts {
        let day = day_key(workout.date);
        for exercise in &workout.exercises {
            let volume: f64 = exercise.sets.iter().map(|s| s.volume()).sum();
            *buckets
                .entry((
                    day.clone(),
                    exercise.muscle_group.as_str(),
                    exercise.exercise_name.as_str(),
                ))
                .or_default() += volume;
        }
    }
    buckets
        .into_iter()
        .map(|((date, group, name), volume)| VolumePoint {
            date,
            muscle_group: group.to_string(),
            exercise_name: name.to_string(),
            volume,
        })
        .collect()
}

/// Zero when there are no sessions.
pub fn total_volume(workouts: &[Workout]) -> f64 {
    workouts
        .iter()
        .flat_map(|w| &w.exercises)
        .flat_map(|e| &e.sets)
        .map(|s| s.volume())
        .sum()
}

#[derive(Clone)]
pub struct AnalyticsEngine {
    db: Database,
}

impl AnalyticsEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn stats(&self, owner_id: &str) -> Result<WorkoutStats, AppError> {
        let workouts = self.db.workouts_for_user(owner_id).await?;
        Ok(WorkoutStats {
            muscle_distribution: muscle_distribution(&workouts),
            volume_progress: volume_progress(&workouts),
        })
    }

    pub async fn total_volume(&self, owner_id: &str) -> Result<TotalVolume, AppError> {
        let workouts = self.db.workouts_for_user(owner_id).await?;
        Ok(TotalVolume {
            total_volume: total_volume(&workouts),
        })
    }
}
