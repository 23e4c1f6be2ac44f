//! Validation, filtering and request handling for the todo service.
//!
//! # Overview
//! Turns untyped request data into typed todo records and store queries,
//! independent of any HTTP framework. The server crate copies route
//! parameters, query pairs and the raw body into an `HttpRequest`, calls a
//! `TodoService` handler, and renders the returned `HttpResponse`.
//!
//! # Design
//! - `schema::Field` is the single list of record fields; validation and
//!   filtering are both driven by it.
//! - `validate` decodes create/update payloads into `CreateTodo` / `TodoPatch`
//!   or an `ApiError`, before any store mutation.
//! - `query::Filter` is a conjunction of typed conditions, evaluated in memory
//!   or compiled to SQL by a store.
//! - `store::TodoStore` is the persistence seam; `MemoryStore` is the
//!   in-process implementation.

pub mod error;
pub mod http;
pub mod query;
pub mod schema;
pub mod service;
pub mod store;
pub mod types;
pub mod validate;

pub use error::{ApiError, StoreError};
pub use http::{HttpRequest, HttpResponse};
pub use query::{Condition, Filter, FilterValue, Op};
pub use schema::Field;
pub use service::TodoService;
pub use store::{MemoryStore, TodoStore};
pub use types::{CreateTodo, Todo, TodoPatch};
