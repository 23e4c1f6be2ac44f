//! axum front end for the todo service.
//!
//! # Design
//! Route handlers here are thin: they copy the route id, query pairs and raw
//! body into a `todo_core::HttpRequest`, call the matching `TodoService`
//! handler, and render the `HttpResponse`. Status codes and error bodies are
//! decided by the core, not by this crate.

pub mod config;
pub mod sqlite;
pub mod telemetry;

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use todo_core::{HttpRequest, HttpResponse, MemoryStore, TodoService, TodoStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use sqlite::SqliteStore;

type QueryPairs = Query<Vec<(String, String)>>;

/// Router over an in-memory store.
pub fn app() -> Router {
    router(Arc::new(MemoryStore::new()))
}

/// Router over the given store.
pub fn router(store: Arc<dyn TodoStore>) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        );

    Router::new()
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(TodoService::new(store))
}

/// Serve `app` until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Wrapper so core responses can be returned from axum handlers.
struct Reply(HttpResponse);

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body)).into_response()
    }
}

fn with_body(req: HttpRequest, body: String) -> HttpRequest {
    if body.trim().is_empty() {
        req
    } else {
        req.with_body(body)
    }
}

async fn health(State(service): State<TodoService>) -> Reply {
    Reply(service.health())
}

async fn list_todos(State(service): State<TodoService>, Query(query): QueryPairs) -> Reply {
    let req = HttpRequest {
        query,
        ..HttpRequest::new()
    };
    Reply(service.list_todos(&req).await)
}

async fn get_todo(State(service): State<TodoService>, Path(id): Path<String>) -> Reply {
    Reply(service.get_todo(&HttpRequest::new().with_id(id)).await)
}

async fn create_todo(State(service): State<TodoService>, body: String) -> Reply {
    let req = with_body(HttpRequest::new(), body);
    Reply(service.create_todo(&req).await)
}

async fn update_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
    body: String,
) -> Reply {
    let req = with_body(HttpRequest::new().with_id(id), body);
    Reply(service.update_todo(&req).await)
}

async fn delete_todo(State(service): State<TodoService>, Path(id): Path<String>) -> Reply {
    Reply(service.delete_todo(&HttpRequest::new().with_id(id)).await)
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
