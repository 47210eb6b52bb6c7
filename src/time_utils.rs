// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Utc};

/// UTC calendar day of a timestamp, `YYYY-MM-DD`.
pub fn day_key(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}
