// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Engines talk to [`Database`], a typed repository over a [`DocumentStore`].
//! The store is the only place that knows how per-document atomicity is
//! achieved (shard locks in memory, transactions in Firestore).

pub mod firestore;
pub mod memory;
pub mod repository;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AppError;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use repository::Database;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Email uniqueness claims (document ID is the normalized email)
    pub const USER_EMAILS: &str = "user_emails";
    pub const RECORDS: &str = "records";
    pub const POSTS: &str = "posts";
    pub const WORKOUTS: &str = "workouts";
    pub const HEALTH_SNAPSHOTS: &str = "health_snapshots";
}

/// A stored JSON object. Every document carries its own `id` field.
pub type Document = Map<String, Value>;

/// Conjunction of field equality clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", id.into())
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    /// The `id` clause, when the filter pins a single document.
    pub fn id(&self) -> Option<&str> {
        self.clauses
            .iter()
            .find(|(field, _)| field == "id")
            .and_then(|(_, value)| value.as_str())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

/// Outcome of an atomic set-membership flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipToggle {
    /// Whether the member is in the set after the flip
    pub is_member: bool,
    /// Set size after the flip
    pub count: usize,
}

/// Merge `patch` into `doc` (top-level keys only).
pub fn apply_patch(doc: &mut Document, patch: &Document) {
    for (key, value) in patch {
        doc.insert(key.clone(), value.clone());
    }
}

/// Flip `member` in the string array at `field`, creating it if absent.
pub fn toggle_in_document(doc: &mut Document, field: &str, member: &str) -> MembershipToggle {
    let mut members: Vec<String> = doc
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let is_member = match members.iter().position(|m| m == member) {
        Some(_) => {
            members.retain(|m| m != member);
            false
        }
        None => {
            members.push(member.to_string());
            true
        }
    };
    let count = members.len();
    doc.insert(
        field.to_string(),
        Value::Array(members.into_iter().map(Value::String).collect()),
    );

    MembershipToggle { is_member, count }
}

/// Storage backend contract.
///
/// `find_and_update`, `find_and_delete` and `atomic_toggle_member` must each
/// be atomic with respect to the single document they touch.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document. Fails with `Conflict` if the ID is taken.
    async fn insert(&self, collection: &str, id: &str, doc: Document) -> Result<(), AppError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, AppError>;

    /// Merge `patch` into the first document matching `filter`; returns it updated.
    async fn find_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, AppError>;

    /// Remove the first document matching `filter`; returns it.
    async fn find_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, AppError>;

    /// Remove every matching document; returns how many were removed.
    async fn delete_matching(&self, collection: &str, filter: &Filter)
        -> Result<usize, AppError>;

    /// Add `member` to the array at `field` if absent, remove it if present.
    /// `None` when the document does not exist.
    async fn atomic_toggle_member(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        member: &str,
    ) -> Result<Option<MembershipToggle>, AppError>;
}
