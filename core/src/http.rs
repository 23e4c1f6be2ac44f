//! Request and response descriptors for the service handlers.
//!
//! # Design
//! Handlers never reach into a framework's request context. The HTTP layer
//! copies what a handler needs (route id, query pairs, raw body) into an
//! `HttpRequest`, and turns the returned `HttpResponse` back into a framework
//! response. Both are plain owned data, so handlers can be tested without a
//! server.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// Everything a handler may read from an inbound request.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    /// The `{id}` route segment, unparsed.
    pub todo_id: Option<String>,
    /// Query-string pairs in the order they appeared.
    pub query: Vec<(String, String)>,
    /// Raw request body. Empty bodies should be passed as `None`.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.todo_id = Some(id.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Parse the body as JSON. Whitespace-only bodies count as absent.
    pub fn json_body(&self) -> Result<Option<Value>, ApiError> {
        match self.body.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => serde_json::from_str(text)
                .map(Some)
                .map_err(|e| ApiError::MalformedBody(e.to_string())),
        }
    }
}

/// A handler's result: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn json<T: Serialize>(status: u16, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => HttpResponse { status, body },
            Err(e) => HttpResponse {
                status: 500,
                body: json!({ "error": format!("serialization failed: {e}") }),
            },
        }
    }

    pub fn error(err: &ApiError) -> Self {
        HttpResponse {
            status: err.status(),
            body: json!({ "error": err.public_message() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
