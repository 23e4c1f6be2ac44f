//! Payload validation for create and update requests.
//!
//! # Design
//! Payloads arrive as untyped JSON. Validation decodes them against the fixed
//! `Field` set and yields either a typed `CreateTodo` / `TodoPatch` or the
//! first `ApiError` encountered. Nothing here touches the store.
//!
//! Create and update share the per-field rules, with one exception: on create
//! a `completed` value that is neither a boolean nor a string is read as
//! `false`. Update rejects it, so a stored flag is never cleared by accident.
//!
//! Create checks field values before it looks for unexpected keys.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::schema::Field;
use crate::types::{CreateTodo, Todo, TodoPatch};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Validate a create payload.
pub fn validate_create(payload: Option<&Value>) -> Result<CreateTodo, ApiError> {
    let map = match payload {
        Some(Value::Object(map)) if map.contains_key(Field::Title.as_str()) => map,
        _ => return Err(ApiError::MissingField(Field::Title)),
    };

    let title = title_value(&map[Field::Title.as_str()])?;
    let completed = match map.get(Field::Completed.as_str()) {
        Some(value) => completed_value(value)?.unwrap_or_else(|| {
            debug!(%value, "non-boolean completed value read as false");
            false
        }),
        None => false,
    };
    let deadline_at = match map.get(Field::DeadlineAt.as_str()) {
        Some(value) => deadline_value(value)?,
        None => None,
    };
    let description = match map.get(Field::Description.as_str()) {
        Some(value) => description_value(value)?,
        None => String::new(),
    };
    reject_unexpected(map)?;

    Ok(CreateTodo {
        title,
        description,
        completed,
        deadline_at,
    })
}

/// Validate an update payload against the record it would modify.
///
/// An absent payload is an empty update. `created_at` and `updated_at` are
/// accepted but ignored; both are system-assigned.
pub fn validate_update(existing: &Todo, payload: Option<&Value>) -> Result<TodoPatch, ApiError> {
    let empty = Map::new();
    let map = match payload {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => return Err(ApiError::InvalidBody),
    };

    if let Some(id) = map.get(Field::Id.as_str()) {
        if id.as_i64() != Some(existing.id) {
            return Err(ApiError::IdMismatch);
        }
    }
    reject_unexpected(map)?;

    let mut patch = TodoPatch::default();
    if let Some(value) = map.get(Field::Title.as_str()) {
        patch.title = Some(title_value(value)?);
    }
    if let Some(value) = map.get(Field::Description.as_str()) {
        patch.description = Some(description_value(value)?);
    }
    if let Some(value) = map.get(Field::Completed.as_str()) {
        let completed = completed_value(value)?.ok_or(ApiError::InvalidBooleanValue)?;
        patch.completed = Some(completed);
    }
    if let Some(value) = map.get(Field::DeadlineAt.as_str()) {
        patch.deadline_at = Some(deadline_value(value)?);
    }
    Ok(patch)
}

/// Parse an ISO-8601 style date-time.
///
/// Accepts a bare date (midnight), a date and time separated by `T` or a
/// space with optional seconds and fraction, or an RFC 3339 timestamp with an
/// offset, which is converted to UTC.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(input, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.naive_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn reject_unexpected(map: &Map<String, Value>) -> Result<(), ApiError> {
    let unexpected: Vec<String> = map
        .keys()
        .filter(|key| Field::from_key(key).is_none())
        .cloned()
        .collect();
    if unexpected.is_empty() {
        Ok(())
    } else {
        Err(ApiError::UnexpectedFields(unexpected))
    }
}

fn title_value(value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(title) if !title.is_empty() => Ok(title.clone()),
        _ => Err(ApiError::InvalidType {
            field: Field::Title,
            expected: "a non-empty string",
        }),
    }
}

fn description_value(value: &Value) -> Result<String, ApiError> {
    match value {
        Value::String(description) => Ok(description.clone()),
        Value::Null => Ok(String::new()),
        _ => Err(ApiError::InvalidType {
            field: Field::Description,
            expected: "a string",
        }),
    }
}

/// `None` when the value is neither a boolean nor a string.
fn completed_value(value: &Value) -> Result<Option<bool>, ApiError> {
    match value {
        Value::Bool(completed) => Ok(Some(*completed)),
        Value::String(text) => match text.to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ApiError::InvalidBooleanValue),
        },
        _ => Ok(None),
    }
}

fn deadline_value(value: &Value) -> Result<Option<NaiveDateTime>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => parse_datetime(text)
            .map(Some)
            .ok_or(ApiError::InvalidDateFormat(Field::DeadlineAt)),
        _ => Err(ApiError::InvalidDateFormat(Field::DeadlineAt)),
    }
}
