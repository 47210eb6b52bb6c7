// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod analytics;
pub mod credentials;
pub mod feed;
pub mod mailer;
pub mod records;
pub mod tokens;

pub use analytics::AnalyticsEngine;
pub use credentials::{CredentialStore, ResetTicket};
pub use feed::FeedEngine;
pub use mailer::Mailer;
pub use records::RecordEngine;
pub use tokens::{TokenError, TokenService};
