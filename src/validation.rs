// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors that deserialize and validate in one step.
//!
//! Every rejection becomes [`AppError::Validation`] with dotted field paths
//! such as `exercises[0].sets[1].reps`, so the client always receives the
//! same `{status, error, errors: [{path, message}]}` shape.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, FieldError};

/// JSON body extractor: rejects empty bodies, unknown fields and rule violations.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::invalid_field("body", "Request body is required"));
        }

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| deserialize_error("body", &e.to_string()))?;
        value
            .validate()
            .map_err(|e| AppError::Validation(flatten_errors(&e)))?;

        Ok(Self(value))
    }
}

/// Query string extractor with the same error reporting as [`ValidatedJson`].
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::try_from_uri(&parts.uri)
            .map_err(|e| deserialize_error("query", &e.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::Validation(flatten_errors(&e)))?;
        Ok(Self(value))
    }
}

/// Single `{id}` path segment, checked to be a UUID before any store access.
#[derive(Debug, Clone)]
pub struct PathId(pub String);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::invalid_field("id", "Must be a valid identifier"))?;
        parse_id(&raw).map(PathId)
    }
}

/// Normalize a UUID string, rejecting anything else.
pub fn parse_id(raw: &str) -> Result<String, AppError> {
    uuid::Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| AppError::invalid_field("id", "Must be a valid identifier"))
}

/// Flatten nested validator output into sorted `{path, message}` pairs.
pub fn flatten_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_errors(errors, "", &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

fn collect_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match (field.as_ref(), prefix.is_empty()) {
            ("__all__", true) => "general".to_string(),
            ("__all__", false) => prefix.to_string(),
            (name, true) => name.to_string(),
            (name, false) => format!("{prefix}.{name}"),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| FieldError::new(&path, describe(e))));
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_errors(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

/// Map a serde failure to a field error, pulling the field name out of
/// `unknown field` / `missing field` messages.
fn deserialize_error(default_path: &str, raw: &str) -> AppError {
    let message = raw
        .rsplit_once(" at line ")
        .map(|(head, _)| head)
        .unwrap_or(raw)
        .trim();
    let message = message
        .strip_prefix("Failed to deserialize query string: ")
        .unwrap_or(message);

    let path = ["unknown field `", "missing field `"]
        .iter()
        .find_map(|marker| {
            let start = message.find(marker)? + marker.len();
            let len = message[start..].find('`')?;
            Some(&message[start..start + len])
        })
        .unwrap_or(default_path);

    AppError::invalid_field(path, message)
}

/// Lenient deserializers for numeric, string and date fields.
///
/// Clients send numbers as JSON numbers or numeric strings, and dates as
/// RFC 3339, `YYYY-MM-DD`, or epoch milliseconds.
pub mod coerce {
    use std::fmt;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use serde::de::{self, Deserialize, Deserializer, Unexpected, Visitor};
    use validator::ValidationError;

    /// Accepted clock skew when checking that a date is not in the future.
    const FUTURE_TOLERANCE_SECS: i64 = 60;

    struct Numeric(f64);

    struct NumericVisitor;

    impl<'de> Visitor<'de> for NumericVisitor {
        type Value = Numeric;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Numeric, E> {
            Ok(Numeric(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Numeric, E> {
            Ok(Numeric(v as f64))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Numeric, E> {
            Ok(Numeric(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Numeric, E> {
            v.trim()
                .parse::<f64>()
                .map(Numeric)
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    impl<'de> Deserialize<'de> for Numeric {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_any(NumericVisitor)
        }
    }

    fn finite<E: de::Error>(value: f64) -> Result<f64, E> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(E::custom("expected a finite number"))
        }
    }

    fn whole<E: de::Error>(value: f64) -> Result<u32, E> {
        let value = finite(value)?;
        if value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
            return Err(E::custom("expected a non-negative whole number"));
        }
        Ok(value as u32)
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        finite(Numeric::deserialize(d)?.0)
    }

    pub fn optional_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Option::<Numeric>::deserialize(d)?
            .map(|n| finite(n.0))
            .transpose()
    }

    pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        whole(Numeric::deserialize(d)?.0)
    }

    pub fn optional_integer<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Option::<Numeric>::deserialize(d)?
            .map(|n| whole(n.0))
            .transpose()
    }

    pub fn trimmed<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(String::deserialize(d)?.trim().to_string())
    }

    pub fn optional_trimmed<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<String>::deserialize(d)?.map(|s| s.trim().to_string()))
    }

    /// Trimmed; blank input counts as absent.
    pub fn optional_nonempty<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(optional_trimmed(d)?.filter(|s| !s.is_empty()))
    }

    /// Trimmed and lowercased.
    pub fn email<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(String::deserialize(d)?.trim().to_lowercase())
    }

    /// Parse RFC 3339, `YYYY-MM-DD` (midnight UTC) or epoch milliseconds.
    pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
        raw.parse::<i64>().ok().and_then(from_millis)
    }

    fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(millis).single()
    }

    struct DateVisitor;

    impl<'de> Visitor<'de> for DateVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an RFC 3339 date, YYYY-MM-DD, or epoch milliseconds")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            from_millis(v).ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            i64::try_from(v)
                .ok()
                .and_then(from_millis)
                .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_date(v).ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    struct DateInput(DateTime<Utc>);

    impl<'de> Deserialize<'de> for DateInput {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_any(DateVisitor).map(DateInput)
        }
    }

    pub fn optional_date<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<DateInput>::deserialize(d)?.map(|input| input.0))
    }

    /// Validator hook: reject dates later than now.
    pub fn not_in_future(date: &DateTime<Utc>) -> Result<(), ValidationError> {
        if *date > Utc::now() + chrono::Duration::seconds(FUTURE_TOLERANCE_SECS) {
            return Err(ValidationError::new("future_date")
                .with_message("Date cannot be in the future".into()));
        }
        Ok(())
    }
}
