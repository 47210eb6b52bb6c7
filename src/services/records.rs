// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strength records: personal-best detection and the global leaderboard.
//!
//! The prior-best read and the new-record write are not atomic. Two
//! concurrent submissions for the same owner and exercise may both be
//! flagged as personal records; the stored 1RM values are still correct.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::error::AppError;
use crate::models::{NewRecord, OneRepMax, PublicProfile, StrengthRecord};

/// A stored record plus the response-only personal-best signal.
#[derive(Debug, Clone, Serialize)]
pub struct SavedRecord {
    #[serde(flatten)]
    pub record: StrengthRecord,
    pub is_new_record: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub exercise_name: String,
    pub muscle_group: String,
    pub brzycki_result: f64,
    pub achieved_at: DateTime<Utc>,
    pub record_id: String,
    pub user: PublicProfile,
}

/// True iff there is no prior record or `candidate` strictly beats the best one.
pub fn is_personal_record(candidate: f64, prior: &[StrengthRecord]) -> bool {
    prior
        .iter()
        .map(|r| r.brzycki_result)
        .max_by(|a, b| a.total_cmp(b))
        .map_or(true, |best| candidate > best)
}

/// Leaderboard ranking: higher Brzycki first, then earliest achieved, then smallest ID.
fn outranks(a: &StrengthRecord, b: &StrengthRecord) -> bool {
    b.brzycki_result
        .total_cmp(&a.brzycki_result)
        .then_with(|| a.achieved_at.cmp(&b.achieved_at))
        .then_with(|| a.id.cmp(&b.id))
        == Ordering::Less
}

/// Single best record per exercise name, ordered by exercise name.
pub fn best_per_exercise(records: &[StrengthRecord]) -> Vec<&StrengthRecord> {
    let mut best: BTreeMap<&str, &StrengthRecord> = BTreeMap::new();
    for record in records {
        best.entry(record.exercise_name.as_str())
            .and_modify(|current| {
                if outranks(record, *current) {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    best.into_values().collect()
}

#[derive(Clone)]
pub struct RecordEngine {
    db: Database,
}

impl RecordEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Compute both estimates, flag a personal best, and persist.
    pub async fn save_record(
        &self,
        owner_id: &str,
        input: NewRecord,
    ) -> Result<SavedRecord, AppError> {
        let estimate = OneRepMax::estimate(input.weight_used, input.reps_done).ok_or_else(|| {
            AppError::invalid_field("reps_done", "Weight and reps are outside the supported range")
        })?;

        let prior = self
            .db
            .records_for_exercise(owner_id, &input.exercise_name)
            .await?;
        let is_new_record = is_personal_record(estimate.brzycki, &prior);

        let now = Utc::now();
        let record = StrengthRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            exercise_name: input.exercise_name,
            muscle_group: input.muscle_group,
            weight_used: input.weight_used,
            reps_done: input.reps_done,
            epley_result: estimate.epley,
            brzycki_result: estimate.brzycki,
            is_personal_record: is_new_record,
            achieved_at: input.date.unwrap_or(now),
            created_at: now,
        };
        self.db.insert_record(&record).await?;

        tracing::info!(
            user_id = %owner_id,
            record_id = %record.id,
            exercise = %record.exercise_name,
            is_new_record,
            "Strength record saved"
        );

        Ok(SavedRecord {
            record,
            is_new_record,
        })
    }

    /// The owner's records, most recent first.
    pub async fn list_records(&self, owner_id: &str) -> Result<Vec<StrengthRecord>, AppError> {
        let mut records = self.db.records_for_user(owner_id).await?;
        records.sort_by(|a, b| {
            b.achieved_at
                .cmp(&a.achieved_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(records)
    }

    /// Best Brzycki estimate per exercise across all owners.
    ///
    /// Owners that no longer exist are skipped.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let records = self.db.all_records().await?;
        let winners = best_per_exercise(&records);

        let owner_ids: Vec<String> = winners.iter().map(|r| r.user_id.clone()).collect();
        let owners = self.db.get_users(&owner_ids).await?;

        Ok(winners
            .into_iter()
            .filter_map(|record| {
                let owner = owners.get(&record.user_id)?;
                Some(LeaderboardEntry {
                    exercise_name: record.exercise_name.clone(),
                    muscle_group: record.muscle_group.clone(),
                    brzycki_result: record.brzycki_result,
                    achieved_at: record.achieved_at,
                    record_id: record.id.clone(),
                    user: owner.public_profile(),
                })
            })
            .collect())
    }

    /// Owner-scoped delete; someone else's record reports not-found.
    pub async fn delete_record(&self, owner_id: &str, record_id: &str) -> Result<(), AppError> {
        if !self.db.delete_record(record_id, owner_id).await? {
            return Err(AppError::NotFound("Record not found".to_string()));
        }
        tracing::info!(user_id = %owner_id, record_id, "Strength record deleted");
        Ok(())
    }
}
