//! The fixed field set of a todo record.
//!
//! # Design
//! Payload validation (allowed keys) and list filtering (filterable fields)
//! both walk `Field::ALL`, so adding a column means touching one enum.

use std::fmt;

/// A field of the `Todo` record, named as it appears in JSON and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Description,
    Completed,
    DeadlineAt,
    CreatedAt,
    UpdatedAt,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 7] = [
        Field::Id,
        Field::Title,
        Field::Description,
        Field::Completed,
        Field::DeadlineAt,
        Field::CreatedAt,
        Field::UpdatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Description => "description",
            Field::Completed => "completed",
            Field::DeadlineAt => "deadline_at",
            Field::CreatedAt => "created_at",
            Field::UpdatedAt => "updated_at",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.as_str() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
