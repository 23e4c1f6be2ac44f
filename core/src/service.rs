//! Request handlers for the todo API.
//!
//! # Design
//! `TodoService` holds only a store handle and carries no per-request state.
//! Each public handler takes an `HttpRequest` and returns an `HttpResponse`;
//! the typed `*_inner` functions do the work and return `ApiError` on
//! failure, which is mapped to a status code in exactly one place.
//!
//! Validation always completes before the store is asked to mutate anything.

use std::sync::Arc;

use serde_json::{json, Map};
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::Filter;
use crate::store::TodoStore;
use crate::types::{self, Todo};
use crate::validate::{validate_create, validate_update};

/// Stateless handler set over a shared store.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub fn health(&self) -> HttpResponse {
        HttpResponse::json(200, &json!({ "status": "ok" }))
    }

    pub async fn list_todos(&self, req: &HttpRequest) -> HttpResponse {
        respond(200, self.list_inner(req).await)
    }

    pub async fn get_todo(&self, req: &HttpRequest) -> HttpResponse {
        respond(200, self.get_inner(req).await)
    }

    pub async fn create_todo(&self, req: &HttpRequest) -> HttpResponse {
        respond(201, self.create_inner(req).await)
    }

    pub async fn update_todo(&self, req: &HttpRequest) -> HttpResponse {
        respond(200, self.update_inner(req).await)
    }

    /// Deleting an absent todo succeeds with an empty object. A route id that
    /// is not an integer is still a 404.
    pub async fn delete_todo(&self, req: &HttpRequest) -> HttpResponse {
        match self.delete_inner(req).await {
            Ok(Some(todo)) => HttpResponse::json(200, &todo),
            Ok(None) => HttpResponse::json(200, &Map::new()),
            Err(err) => failure(err),
        }
    }

    async fn list_inner(&self, req: &HttpRequest) -> Result<Vec<Todo>, ApiError> {
        let filter = Filter::from_query(&req.query, types::now())?;
        let todos = self.store.query(&filter).await?;
        debug!(conditions = filter.conditions().len(), matched = todos.len(), "listed todos");
        Ok(todos)
    }

    async fn get_inner(&self, req: &HttpRequest) -> Result<Todo, ApiError> {
        let id = route_id(req)?;
        self.store.get(id).await?.ok_or(ApiError::NotFound)
    }

    async fn create_inner(&self, req: &HttpRequest) -> Result<Todo, ApiError> {
        let body = req.json_body()?;
        let input = validate_create(body.as_ref())?;
        let todo = self.store.insert(input, types::now()).await?;
        info!(id = todo.id, "created todo");
        Ok(todo)
    }

    async fn update_inner(&self, req: &HttpRequest) -> Result<Todo, ApiError> {
        let id = route_id(req)?;
        let mut todo = self.store.get(id).await?.ok_or(ApiError::NotFound)?;
        let body = req.json_body()?;
        let patch = validate_update(&todo, body.as_ref())?;
        patch.apply(&mut todo, types::now());
        let todo = self.store.update(&todo).await?.ok_or(ApiError::NotFound)?;
        info!(id = todo.id, "updated todo");
        Ok(todo)
    }

    async fn delete_inner(&self, req: &HttpRequest) -> Result<Option<Todo>, ApiError> {
        let id = route_id(req)?;
        let Some(todo) = self.store.get(id).await? else {
            debug!(id, "delete of absent todo");
            return Ok(None);
        };
        self.store.delete(id).await?;
        info!(id, "deleted todo");
        Ok(Some(todo))
    }
}

/// Route ids are non-negative decimal integers; anything else names no todo.
fn route_id(req: &HttpRequest) -> Result<i64, ApiError> {
    let raw = req.todo_id.as_deref().ok_or(ApiError::NotFound)?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn respond<T: serde::Serialize>(status: u16, result: Result<T, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(status, &payload),
        Err(err) => failure(err),
    }
}

fn failure(err: ApiError) -> HttpResponse {
    if let ApiError::Store(source) = &err {
        error!(error = %source, "store operation failed");
    } else {
        debug!(error = %err, "request rejected");
    }
    HttpResponse::error(&err)
}
