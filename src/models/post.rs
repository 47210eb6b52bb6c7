// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::catalog::validate_muscle_group_tags;
use crate::validation::coerce;

/// Post stored in the `posts` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub muscle_groups: Vec<String>,
    /// Identity IDs that liked the post; never contains duplicates
    #[serde(default)]
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

/// Collapse repeated tags, keeping first-seen order.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Create or full-replace payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewPost {
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(length(min = 5, max = 100, message = "Title must be 5-100 characters"))]
    pub title: String,
    #[serde(deserialize_with = "coerce::trimmed")]
    #[validate(length(min = 10, max = 2000, message = "Content must be 10-2000 characters"))]
    pub content: String,
    #[validate(
        length(min = 1, max = 5, message = "Choose between 1 and 5 muscle groups"),
        custom(function = "validate_muscle_group_tags")
    )]
    pub muscle_groups: Vec<String>,
}

/// Partial update payload.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "require_post_change"))]
pub struct PostChanges {
    #[serde(default, deserialize_with = "coerce::optional_trimmed")]
    #[validate(length(min = 5, max = 100, message = "Title must be 5-100 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_trimmed")]
    #[validate(length(min = 10, max = 2000, message = "Content must be 10-2000 characters"))]
    pub content: Option<String>,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 5, message = "Choose between 1 and 5 muscle groups"),
        custom(function = "validate_muscle_group_tags")
    )]
    pub muscle_groups: Option<Vec<String>>,
}

fn require_post_change(changes: &PostChanges) -> Result<(), ValidationError> {
    if changes.title.is_none() && changes.content.is_none() && changes.muscle_groups.is_none() {
        return Err(ValidationError::new("empty_update")
            .with_message("At least one field must be provided".into()));
    }
    Ok(())
}

impl From<NewPost> for PostChanges {
    fn from(post: NewPost) -> Self {
        Self {
            title: Some(post.title),
            content: Some(post.content),
            muscle_groups: Some(post.muscle_groups),
        }
    }
}
