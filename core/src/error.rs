//! Error types for the todo service.
//!
//! # Design
//! Every rejection the service can produce is an `ApiError` variant, and each
//! variant knows its HTTP status. Validation variants are raised before the
//! store is touched; `Store` is the only variant that can follow a store call.

use thiserror::Error;

use crate::schema::Field;

/// Failure reported by a `TodoStore` backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// Errors returned by `TodoService` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(Field),

    #[error("Unexpected fields: {}", .0.join(", "))]
    UnexpectedFields(Vec<String>),

    #[error("Invalid value for {field}. Must be {expected}.")]
    InvalidType { field: Field, expected: &'static str },

    #[error("Invalid value for completed. Must be true or false.")]
    InvalidBooleanValue,

    #[error("Invalid date format for {0}. Use ISO 8601 format.")]
    InvalidDateFormat(Field),

    #[error("Invalid window value")]
    InvalidWindowValue,

    #[error("Invalid value for {0} filter")]
    InvalidFilterValue(Field),

    #[error("Invalid todo ID")]
    IdMismatch,

    #[error("Request body must be a JSON object")]
    InvalidBody,

    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),

    /// The requested todo does not exist.
    #[error("Todo not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NotFound => 404,
            ApiError::Store(_) => 500,
            _ => 400,
        }
    }

    /// Message safe to return to the client. Store failures are not echoed.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let errors = [
            ApiError::MissingField(Field::Title),
            ApiError::UnexpectedFields(vec!["foo".to_string()]),
            ApiError::InvalidBooleanValue,
            ApiError::InvalidDateFormat(Field::DeadlineAt),
            ApiError::InvalidWindowValue,
            ApiError::InvalidFilterValue(Field::Id),
            ApiError::IdMismatch,
            ApiError::InvalidBody,
        ];
        for err in errors {
            assert_eq!(err.status(), 400, "{err}");
        }
    }

    #[test]
    fn not_found_is_404() {
        assert_eq!(ApiError::NotFound.status(), 404);
        assert_eq!(ApiError::NotFound.to_string(), "Todo not found");
    }

    #[test]
    fn messages_name_the_offending_fields() {
        assert_eq!(
            ApiError::MissingField(Field::Title).to_string(),
            "Missing required field: title"
        );
        assert_eq!(
            ApiError::UnexpectedFields(vec!["foo".into(), "bar".into()]).to_string(),
            "Unexpected fields: foo, bar"
        );
        assert_eq!(
            ApiError::InvalidDateFormat(Field::DeadlineAt).to_string(),
            "Invalid date format for deadline_at. Use ISO 8601 format."
        );
    }

    #[test]
    fn store_errors_are_hidden_from_clients() {
        let io = std::io::Error::other("disk on fire");
        let err = ApiError::from(StoreError::backend(io));
        assert_eq!(err.status(), 500);
        assert_eq!(err.public_message(), "Internal storage error");
        assert!(err.to_string().contains("disk on fire"));
    }
}
