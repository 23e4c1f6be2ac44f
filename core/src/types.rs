//! Domain types for the todo service.
//!
//! # Design
//! `Todo` is the stored record and the JSON response shape. `CreateTodo` and
//! `TodoPatch` are only ever produced by the validator, so code holding one
//! can assume its fields are well-formed.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A single todo item as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub deadline_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Validated fields for a new todo. The store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub deadline_at: Option<NaiveDateTime>,
}

impl CreateTodo {
    /// Build the stored record once the store has picked an id.
    pub fn into_todo(self, id: i64, now: NaiveDateTime) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            deadline_at: self.deadline_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated changes to an existing todo. `None` leaves a field untouched;
/// `deadline_at: Some(None)` clears the deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub deadline_at: Option<Option<NaiveDateTime>>,
}

impl TodoPatch {
    /// Apply the patch and refresh `updated_at`.
    pub fn apply(self, todo: &mut Todo, now: NaiveDateTime) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(deadline_at) = self.deadline_at {
            todo.deadline_at = deadline_at;
        }
        todo.updated_at = now;
    }
}

/// Current UTC time as a naive timestamp, truncated to microseconds.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}
