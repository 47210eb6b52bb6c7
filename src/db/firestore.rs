// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed document store.
//!
//! Single-document reads and writes go through the fluent API directly.
//! Read-modify-write operations (`find_and_update`, `find_and_delete`,
//! `atomic_toggle_member`) read inside a transaction so a concurrent commit
//! to the same document aborts ours instead of being overwritten.

use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreConsistencySelector;

use crate::db::{
    apply_patch, toggle_in_document, Document, DocumentStore, Filter, MembershipToggle,
};
use crate::error::AppError;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Attempts for one read-modify-write before a contention abort surfaces.
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// Commit failures that a fresh attempt may fix become `Conflict`.
fn commit_error(e: FirestoreError) -> AppError {
    match e {
        FirestoreError::DatabaseError(ref err) if err.retry_possible => {
            AppError::Conflict(format!("Transaction aborted: {}", err.details))
        }
        other => db_error(other),
    }
}

fn db_error(e: FirestoreError) -> AppError {
    match e {
        FirestoreError::DataConflictError(_) => {
            AppError::Conflict("Document was modified concurrently or already exists".to_string())
        }
        other => AppError::Database(other.to_string()),
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJldm9sdXRmaXQifQ."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore emulator");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Offline client: every operation fails with a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// IDs of documents that currently match; re-checked inside transactions.
    async fn candidate_ids(&self, collection: &str, filter: &Filter) -> Result<Vec<String>, AppError> {
        if let Some(id) = filter.id() {
            return Ok(vec![id.to_string()]);
        }
        let docs = self.find(collection, filter).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| doc.get("id").and_then(|v| v.as_str()).map(str::to_string))
            .collect())
    }

    /// Read one document inside a transaction, apply `change`, and commit the
    /// result. `change` returns `None` to leave the document untouched.
    ///
    /// Aborted commits are retried up to [`MAX_TRANSACTION_ATTEMPTS`] times.
    async fn modify_in_transaction<T, F>(
        &self,
        collection: &str,
        id: &str,
        change: F,
    ) -> Result<Option<T>, AppError>
    where
        F: Fn(&mut Document) -> Option<(T, bool)> + Send + Sync,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match self.try_modify(collection, id, &change).await {
                Err(AppError::Conflict(reason)) if attempt < MAX_TRANSACTION_ATTEMPTS => {
                    tracing::debug!(collection, id, attempt, reason = %reason, "Transaction aborted, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn try_modify<T, F>(
        &self,
        collection: &str,
        id: &str,
        change: &F,
    ) -> Result<Option<T>, AppError>
    where
        F: Fn(&mut Document) -> Option<(T, bool)> + Send + Sync,
        T: Send,
    {
        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );
        let current: Option<Document> = tx_client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(db_error)?;

        let Some(mut doc) = current else {
            let _ = transaction.rollback().await;
            return Ok(None);
        };

        // (result, delete) where delete removes instead of rewriting
        let Some((result, delete)) = change(&mut doc) else {
            let _ = transaction.rollback().await;
            return Ok(None);
        };

        if delete {
            client
                .fluent()
                .delete()
                .from(collection)
                .document_id(id)
                .add_to_transaction(&mut transaction)
                .map_err(db_error)?;
        } else {
            client
                .fluent()
                .update()
                .in_col(collection)
                .document_id(id)
                .object(&doc)
                .add_to_transaction(&mut transaction)
                .map_err(db_error)?;
        }

        transaction.commit().await.map_err(commit_error)?;
        Ok(Some(result))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn insert(&self, collection: &str, id: &str, doc: Document) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(id)
            .object(&doc)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(db_error)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, AppError> {
        let clauses = filter.clauses().to_vec();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| {
                q.for_all(
                    clauses
                        .iter()
                        .map(|(field, value)| q.field(field.as_str()).eq(value.clone())),
                )
            })
            .order_by([("id", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(db_error)
    }

    async fn find_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, AppError> {
        for id in self.candidate_ids(collection, filter).await? {
            let updated = self
                .modify_in_transaction(collection, &id, |doc| {
                    if !filter.matches(doc) {
                        return None;
                    }
                    apply_patch(doc, &patch);
                    Some((doc.clone(), false))
                })
                .await?;
            if updated.is_some() {
                return Ok(updated);
            }
        }
        Ok(None)
    }

    async fn find_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, AppError> {
        for id in self.candidate_ids(collection, filter).await? {
            let removed = self
                .modify_in_transaction(collection, &id, |doc| {
                    filter.matches(doc).then(|| (doc.clone(), true))
                })
                .await?;
            if removed.is_some() {
                return Ok(removed);
            }
        }
        Ok(None)
    }

    async fn delete_matching(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<usize, AppError> {
        let client = self.get_client()?;
        let ids = self.candidate_ids(collection, filter).await?;

        for chunk in ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(ids.len())
    }

    async fn atomic_toggle_member(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        member: &str,
    ) -> Result<Option<MembershipToggle>, AppError> {
        self.modify_in_transaction(collection, id, |doc| {
            Some((toggle_in_document(doc, field, member), false))
        })
        .await
    }
}
