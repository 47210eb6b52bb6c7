// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod catalog;
pub mod health;
pub mod post;
pub mod record;
pub mod user;
pub mod workout;

pub use health::{Gender, HealthSnapshot, NewHealthSnapshot};
pub use post::{NewPost, Post, PostChanges};
pub use record::{NewRecord, OneRepMax, StrengthRecord};
pub use user::{AuthorSummary, PublicProfile, User, UserProfile};
pub use workout::{Exercise, NewWorkout, Workout, WorkoutSet};
