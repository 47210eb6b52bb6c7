// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Social feed: filtering, sorting, pagination and likes.
//!
//! Pipeline order is filter, sort, author join, paginate. Posts whose author
//! is gone are dropped before paging so pages stay full.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::db::{repository::to_document, Database};
use crate::error::AppError;
use crate::models::catalog::validate_muscle_group;
use crate::models::post::dedup_tags;
use crate::models::{AuthorSummary, NewPost, Post, PostChanges, User};
use crate::validation::coerce;

/// Maximum items per page.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    #[default]
    Recent,
    Oldest,
    Popular,
}

/// Query parameters for `GET /api/social`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FeedQuery {
    #[serde(default)]
    pub sort: FeedSort,
    #[serde(default, deserialize_with = "coerce::optional_nonempty")]
    #[validate(custom(function = "validate_muscle_group"))]
    pub muscle: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_nonempty")]
    #[validate(length(max = 50, message = "Search must be at most 50 characters"))]
    pub search: Option<String>,
    #[serde(default = "default_page", deserialize_with = "coerce::integer")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,
    #[serde(default = "default_limit", deserialize_with = "coerce::integer")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: u32,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            sort: FeedSort::default(),
            muscle: None,
            search: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// A post as seen by one viewer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub muscle_groups: Vec<String>,
    pub likes: usize,
    pub is_liked: bool,
    pub author: AuthorSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedPost {
    pub fn new(post: Post, author: AuthorSummary, viewer_id: &str) -> Self {
        Self {
            likes: post.like_count(),
            is_liked: post.is_liked_by(viewer_id),
            id: post.id,
            title: post.title,
            content: post.content,
            muscle_groups: post.muscle_groups,
            author,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LikeToggle {
    pub likes: usize,
    pub is_liked: bool,
}

/// Apply the muscle and search filters, then sort.
pub fn filter_and_sort(posts: Vec<Post>, query: &FeedQuery) -> Vec<Post> {
    let needle = query.search.as_ref().map(|s| s.to_lowercase());

    let mut selected: Vec<Post> = posts
        .into_iter()
        .filter(|post| match &query.muscle {
            Some(muscle) => post.muscle_groups.iter().any(|tag| tag == muscle),
            None => true,
        })
        .filter(|post| match &needle {
            Some(needle) => {
                post.title.to_lowercase().contains(needle)
                    || post.content.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    let newest_first =
        |a: &Post, b: &Post| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id));

    selected.sort_by(|a, b| match query.sort {
        FeedSort::Recent => newest_first(a, b),
        FeedSort::Oldest => a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)),
        FeedSort::Popular => match b.like_count().cmp(&a.like_count()) {
            Ordering::Equal => newest_first(a, b),
            other => other,
        },
    });
    selected
}

/// Offset/limit window; empty when the page is past the end.
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Vec<T> {
    let limit = limit.min(MAX_PAGE_SIZE) as usize;
    let skip = (page.max(1) as usize - 1).checked_mul(limit);
    match skip {
        Some(skip) => items.into_iter().skip(skip).take(limit).collect(),
        None => Vec::new(),
    }
}

/// Join authors onto sorted posts, drop orphans, and cut the requested page.
pub fn join_and_paginate(
    sorted: Vec<Post>,
    query: &FeedQuery,
    authors: &HashMap<String, User>,
    viewer_id: &str,
) -> Vec<FeedPost> {
    let joined: Vec<FeedPost> = sorted
        .into_iter()
        .filter_map(|post| {
            let author = authors.get(&post.author_id)?.author_summary();
            Some(FeedPost::new(post, author, viewer_id))
        })
        .collect();
    paginate(joined, query.page, query.limit)
}

/// Full feed pipeline over already-loaded posts and authors.
pub fn select_page(
    posts: Vec<Post>,
    query: &FeedQuery,
    authors: &HashMap<String, User>,
    viewer_id: &str,
) -> Vec<FeedPost> {
    join_and_paginate(filter_and_sort(posts, query), query, authors, viewer_id)
}

#[derive(Clone)]
pub struct FeedEngine {
    db: Database,
}

impl FeedEngine {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list_posts(
        &self,
        viewer_id: &str,
        query: &FeedQuery,
    ) -> Result<Vec<FeedPost>, AppError> {
        let posts = filter_and_sort(self.db.all_posts().await?, query);
        let author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        let authors = self.db.get_users(&author_ids).await?;
        Ok(join_and_paginate(posts, query, &authors, viewer_id))
    }

    pub async fn create_post(
        &self,
        author: &AuthorSummary,
        input: NewPost,
    ) -> Result<FeedPost, AppError> {
        let now = Utc::now();
        let post = Post {
            id: uuid::Uuid::new_v4().to_string(),
            author_id: author.id.clone(),
            title: input.title,
            content: input.content,
            muscle_groups: dedup_tags(input.muscle_groups),
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_post(&post).await?;
        tracing::info!(user_id = %author.id, post_id = %post.id, "Post created");
        Ok(FeedPost::new(post, author.clone(), &author.id))
    }

    /// Author-scoped update of the provided fields.
    pub async fn update_post(
        &self,
        author: &AuthorSummary,
        post_id: &str,
        changes: PostChanges,
    ) -> Result<FeedPost, AppError> {
        let mut patch = serde_json::Map::new();
        if let Some(title) = changes.title {
            patch.insert("title".to_string(), Value::String(title));
        }
        if let Some(content) = changes.content {
            patch.insert("content".to_string(), Value::String(content));
        }
        if let Some(tags) = changes.muscle_groups {
            patch.insert(
                "muscle_groups".to_string(),
                Value::Array(dedup_tags(tags).into_iter().map(Value::String).collect()),
            );
        }
        patch.extend(to_document(&serde_json::json!({ "updated_at": Utc::now() }))?);

        let post = self
            .db
            .update_post(post_id, &author.id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        Ok(FeedPost::new(post, author.clone(), &author.id))
    }

    pub async fn delete_post(&self, author_id: &str, post_id: &str) -> Result<(), AppError> {
        if !self.db.delete_post(post_id, author_id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        tracing::info!(user_id = %author_id, post_id, "Post deleted");
        Ok(())
    }

    /// Flip the actor's like in one atomic store operation.
    pub async fn toggle_like(&self, actor_id: &str, post_id: &str) -> Result<LikeToggle, AppError> {
        let toggle = self
            .db
            .toggle_like(post_id, actor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        tracing::debug!(
            user_id = %actor_id,
            post_id,
            is_liked = toggle.is_member,
            likes = toggle.count,
            "Like toggled"
        );
        Ok(LikeToggle {
            likes: toggle.count,
            is_liked: toggle.is_member,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(id: &str, author: &str, minutes_ago: i64, likes: &[&str], tags: &[&str]) -> Post {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        Post {
            id: id.to_string(),
            author_id: author.to_string(),
            title: format!("Title {id}"),
            content: format!("Content for post {id}"),
            muscle_groups: tags.iter().map(|t| t.to_string()).collect(),
            likes: likes.iter().map(|l| l.to_string()).collect(),
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_sort_orders() {
        let posts = vec![
            post("a", "u", 30, &["x"], &["Pecho"]),
            post("b", "u", 10, &[], &["Pecho"]),
            post("c", "u", 20, &["x", "y"], &["Espalda"]),
            post("d", "u", 5, &["x"], &["Pecho"]),
        ];

        let recent = filter_and_sort(posts.clone(), &FeedQuery::default());
        assert_eq!(ids(&recent), vec!["d", "b", "c", "a"]);

        let oldest = filter_and_sort(
            posts.clone(),
            &FeedQuery {
                sort: FeedSort::Oldest,
                ..FeedQuery::default()
            },
        );
        assert_eq!(ids(&oldest), vec!["a", "c", "b", "d"]);

        // Popular ties fall back to newest first.
        let popular = filter_and_sort(
            posts,
            &FeedQuery {
                sort: FeedSort::Popular,
                ..FeedQuery::default()
            },
        );
        assert_eq!(ids(&popular), vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_filters() {
        let mut posts = vec![
            post("a", "u", 3, &[], &["Pecho", "Tríceps"]),
            post("b", "u", 2, &[], &["Espalda"]),
            post("c", "u", 1, &[], &["Tríceps"]),
        ];
        posts[1].title = "Deadlift PR today".to_string();

        let by_muscle = filter_and_sort(
            posts.clone(),
            &FeedQuery {
                muscle: Some("Tríceps".to_string()),
                ..FeedQuery::default()
            },
        );
        assert_eq!(ids(&by_muscle), vec!["c", "a"]);

        let by_search = filter_and_sort(
            posts,
            &FeedQuery {
                search: Some("deadLIFT".to_string()),
                ..FeedQuery::default()
            },
        );
        assert_eq!(ids(&by_search), vec!["b"]);
    }

    #[test]
    fn test_paginate_windows() {
        let items: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(items.clone(), 1, 10), (1..=10).collect::<Vec<_>>());
        assert_eq!(paginate(items.clone(), 2, 10), (11..=20).collect::<Vec<_>>());
        assert_eq!(paginate(items.clone(), 3, 10), (21..=25).collect::<Vec<_>>());
        assert!(paginate(items.clone(), 4, 10).is_empty());
        assert_eq!(paginate(items.clone(), 1, 500).len(), 25);
        assert!(paginate(items, u32::MAX, 100).is_empty());
    }

    #[test]
    fn test_orphaned_posts_dropped() {
        let now = Utc::now();
        let author = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            lastname: "García".to_string(),
            email: "a@x.com".to_string(),
            age: 30,
            avatar: None,
            password_hash: String::new(),
            is_active: true,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        let authors = HashMap::from([("u1".to_string(), author)]);
        let posts = vec![
            post("a", "u1", 2, &["viewer"], &["Pecho"]),
            post("b", "ghost", 1, &[], &["Pecho"]),
        ];

        let page = select_page(posts, &FeedQuery::default(), &authors, "viewer");
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "a");
        assert!(page[0].is_liked);
        assert_eq!(page[0].likes, 1);
        assert_eq!(page[0].author.name, "Ana");
    }

    #[test]
    fn test_feed_query_defaults_and_bounds() {
        let q: FeedQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(q.sort, FeedSort::Recent);

        let q: FeedQuery =
            serde_json::from_value(serde_json::json!({ "limit": "101", "page": 0 })).unwrap();
        let errors = q.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("limit"));
        assert!(errors.field_errors().contains_key("page"));
    }
}
