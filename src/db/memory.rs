// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local document store.
//!
//! Each collection is a `DashMap`; per-document read-modify-write runs under
//! the entry's shard write lock. Scans collect keys first and re-check the
//! filter under the lock, so a concurrent writer can never be observed
//! half-applied.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::db::{
    apply_patch, toggle_in_document, Document, DocumentStore, Filter, MembershipToggle,
};
use crate::error::AppError;

type Collection = DashMap<String, Document>;

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Arc<Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> Arc<Collection> {
        self.collections
            .entry(name.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Keys that may match `filter`; callers re-check under the entry lock.
    fn candidates(col: &Collection, filter: &Filter) -> Vec<String> {
        if let Some(id) = filter.id() {
            return vec![id.to_string()];
        }
        let mut keys: Vec<String> = col
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: &str, doc: Document) -> Result<(), AppError> {
        match self.collection(collection).entry(id.to_string()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "Document {id} already exists in {collection}"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(doc);
                Ok(())
            }
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        Ok(self
            .collection(collection)
            .get(id)
            .map(|entry| entry.value().clone()))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, AppError> {
        let col = self.collection(collection);
        let mut docs: Vec<(String, Document)> = col
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(docs.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn find_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, AppError> {
        let col = self.collection(collection);
        for key in Self::candidates(&col, filter) {
            if let Some(mut entry) = col.get_mut(&key) {
                if filter.matches(entry.value()) {
                    apply_patch(entry.value_mut(), &patch);
                    return Ok(Some(entry.value().clone()));
                }
            }
        }
        Ok(None)
    }

    async fn find_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, AppError> {
        let col = self.collection(collection);
        for key in Self::candidates(&col, filter) {
            if let Some((_, doc)) = col.remove_if(&key, |_, doc| filter.matches(doc)) {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    async fn delete_matching(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<usize, AppError> {
        let col = self.collection(collection);
        let removed = Self::candidates(&col, filter)
            .into_iter()
            .filter(|key| col.remove_if(key, |_, doc| filter.matches(doc)).is_some())
            .count();
        Ok(removed)
    }

    async fn atomic_toggle_member(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        member: &str,
    ) -> Result<Option<MembershipToggle>, AppError> {
        Ok(self
            .collection(collection)
            .get_mut(id)
            .map(|mut entry| toggle_in_document(entry.value_mut(), field, member)))
    }
}
