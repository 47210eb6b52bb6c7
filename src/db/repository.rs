// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed operations over the document store.
//!
//! Provides high-level operations for:
//! - Users (identities and email uniqueness claims)
//! - Records (strength records)
//! - Posts (social feed)
//! - Workouts and health snapshots

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::config::{Config, StoreBackend};
use crate::db::{
    collections, Document, DocumentStore, Filter, FirestoreStore, MembershipToggle, MemoryStore,
};
use crate::error::AppError;
use crate::models::{HealthSnapshot, Post, StrengthRecord, User, Workout};

const MAX_CONCURRENT_DB_OPS: usize = 50;

pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!(
            "model did not serialize to an object"
        ))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| AppError::Database(format!("Malformed document: {}", e)))
}

fn from_documents<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, AppError> {
    docs.into_iter().map(from_document).collect()
}

fn owned(id: &str, user_id: &str) -> Filter {
    Filter::by_id(id).eq("user_id", user_id)
}

/// Handle to the application database.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
}

impl Database {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fresh process-local database.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open the backend selected by configuration.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::in_memory())
            }
            StoreBackend::Firestore => {
                let store = FirestoreStore::new(&config.gcp_project_id).await?;
                Ok(Self::new(Arc::new(store)))
            }
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Persist a new identity, enforcing email uniqueness.
    ///
    /// The email claim document is created first; its insert is the
    /// uniqueness check on every backend.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let claim = to_document(&json!({ "id": user.email, "user_id": user.id }))?;
        self.store
            .insert(collections::USER_EMAILS, &user.email, claim)
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict("Email is already registered".into()),
                other => other,
            })?;

        if let Err(e) = self
            .store
            .insert(collections::USERS, &user.id, to_document(user)?)
            .await
        {
            self.release_email(&user.email).await?;
            return Err(e);
        }
        Ok(())
    }

    async fn release_email(&self, email: &str) -> Result<(), AppError> {
        self.store
            .find_and_delete(collections::USER_EMAILS, &Filter::by_id(email))
            .await?;
        Ok(())
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.store
            .get(collections::USERS, id)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let Some(claim) = self.store.get(collections::USER_EMAILS, email).await? else {
            return Ok(None);
        };
        match claim.get("user_id").and_then(Value::as_str) {
            Some(user_id) => self.get_user(user_id).await,
            None => Ok(None),
        }
    }

    pub async fn find_user_by_reset_hash(&self, hash: &str) -> Result<Option<User>, AppError> {
        let docs = self
            .store
            .find(
                collections::USERS,
                &Filter::new().eq("reset_token_hash", hash),
            )
            .await?;
        docs.into_iter().next().map(from_document).transpose()
    }

    /// Overwrite a stored identity if it is unchanged since `expected_updated_at`.
    ///
    /// Returns `None` when the identity is gone or was modified concurrently.
    pub async fn replace_user(
        &self,
        user: &User,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let expected = serde_json::to_value(expected_updated_at)
            .map_err(|e| AppError::Internal(e.into()))?;
        let filter = Filter::by_id(&user.id).eq("updated_at", expected);
        self.store
            .find_and_update(collections::USERS, &filter, to_document(user)?)
            .await?
            .map(from_document)
            .transpose()
    }

    /// Conditionally patch one identity; `filter` must pin the document.
    pub async fn patch_user(
        &self,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<User>, AppError> {
        self.store
            .find_and_update(collections::USERS, filter, patch)
            .await?
            .map(from_document)
            .transpose()
    }

    /// Look up many identities concurrently. Missing IDs are absent from the map.
    pub async fn get_users(&self, ids: &[String]) -> Result<HashMap<String, User>, AppError> {
        let mut unique = ids.to_vec();
        unique.sort();
        unique.dedup();

        let found = stream::iter(unique)
            .map(|id| {
                let db = self.clone();
                async move { db.get_user(&id).await }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<User>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<User>>, AppError>>()?;

        Ok(found
            .into_iter()
            .flatten()
            .map(|user| (user.id.clone(), user))
            .collect())
    }

    /// Delete an identity and everything it owns.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user: &User) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        for (collection, owner_field) in [
            (collections::RECORDS, "user_id"),
            (collections::WORKOUTS, "user_id"),
            (collections::HEALTH_SNAPSHOTS, "user_id"),
            (collections::POSTS, "author_id"),
        ] {
            let count = self
                .store
                .delete_matching(collection, &Filter::new().eq(owner_field, user.id.as_str()))
                .await?;
            tracing::debug!(user_id = %user.id, collection, count, "Deleted owned documents");
            deleted_count += count;
        }

        if self
            .store
            .find_and_delete(collections::USERS, &Filter::by_id(&user.id))
            .await?
            .is_some()
        {
            deleted_count += 1;
        }
        self.release_email(&user.email).await?;

        tracing::info!(user_id = %user.id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }

    // ─── Record Operations ───────────────────────────────────────

    pub async fn insert_record(&self, record: &StrengthRecord) -> Result<(), AppError> {
        self.store
            .insert(collections::RECORDS, &record.id, to_document(record)?)
            .await
    }

    pub async fn records_for_user(&self, user_id: &str) -> Result<Vec<StrengthRecord>, AppError> {
        let docs = self
            .store
            .find(collections::RECORDS, &Filter::new().eq("user_id", user_id))
            .await?;
        from_documents(docs)
    }

    pub async fn records_for_exercise(
        &self,
        user_id: &str,
        exercise_name: &str,
    ) -> Result<Vec<StrengthRecord>, AppError> {
        let filter = Filter::new()
            .eq("user_id", user_id)
            .eq("exercise_name", exercise_name);
        from_documents(self.store.find(collections::RECORDS, &filter).await?)
    }

    pub async fn all_records(&self) -> Result<Vec<StrengthRecord>, AppError> {
        from_documents(self.store.find(collections::RECORDS, &Filter::new()).await?)
    }

    /// Owner-scoped delete; `false` when absent or owned by someone else.
    pub async fn delete_record(&self, id: &str, user_id: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .find_and_delete(collections::RECORDS, &owned(id, user_id))
            .await?
            .is_some())
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        self.store
            .insert(collections::POSTS, &post.id, to_document(post)?)
            .await
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        self.store
            .get(collections::POSTS, id)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn all_posts(&self) -> Result<Vec<Post>, AppError> {
        from_documents(self.store.find(collections::POSTS, &Filter::new()).await?)
    }

    /// Author-scoped patch; `None` when absent or authored by someone else.
    pub async fn update_post(
        &self,
        id: &str,
        author_id: &str,
        patch: Document,
    ) -> Result<Option<Post>, AppError> {
        let filter = Filter::by_id(id).eq("author_id", author_id);
        self.store
            .find_and_update(collections::POSTS, &filter, patch)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn delete_post(&self, id: &str, author_id: &str) -> Result<bool, AppError> {
        let filter = Filter::by_id(id).eq("author_id", author_id);
        Ok(self
            .store
            .find_and_delete(collections::POSTS, &filter)
            .await?
            .is_some())
    }

    pub async fn toggle_like(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<MembershipToggle>, AppError> {
        self.store
            .atomic_toggle_member(collections::POSTS, post_id, "likes", user_id)
            .await
    }

    // ─── Workout Operations ──────────────────────────────────────

    pub async fn insert_workout(&self, workout: &Workout) -> Result<(), AppError> {
        self.store
            .insert(collections::WORKOUTS, &workout.id, to_document(workout)?)
            .await
    }

    pub async fn workouts_for_user(&self, user_id: &str) -> Result<Vec<Workout>, AppError> {
        let docs = self
            .store
            .find(collections::WORKOUTS, &Filter::new().eq("user_id", user_id))
            .await?;
        from_documents(docs)
    }

    pub async fn get_workout(&self, id: &str, user_id: &str) -> Result<Option<Workout>, AppError> {
        let docs = self
            .store
            .find(collections::WORKOUTS, &owned(id, user_id))
            .await?;
        docs.into_iter().next().map(from_document).transpose()
    }

    pub async fn delete_workout(&self, id: &str, user_id: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .find_and_delete(collections::WORKOUTS, &owned(id, user_id))
            .await?
            .is_some())
    }

    // ─── Health Snapshot Operations ──────────────────────────────

    pub async fn insert_health_snapshot(&self, snapshot: &HealthSnapshot) -> Result<(), AppError> {
        self.store
            .insert(
                collections::HEALTH_SNAPSHOTS,
                &snapshot.id,
                to_document(snapshot)?,
            )
            .await
    }

    pub async fn health_for_user(&self, user_id: &str) -> Result<Vec<HealthSnapshot>, AppError> {
        let docs = self
            .store
            .find(
                collections::HEALTH_SNAPSHOTS,
                &Filter::new().eq("user_id", user_id),
            )
            .await?;
        from_documents(docs)
    }

    pub async fn delete_health_snapshot(&self, id: &str, user_id: &str) -> Result<bool, AppError> {
        Ok(self
            .store
            .find_and_delete(collections::HEALTH_SNAPSHOTS, &owned(id, user_id))
            .await?
            .is_some())
    }
}
