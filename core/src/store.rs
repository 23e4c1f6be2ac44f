//! Record store interface and the in-memory implementation.
//!
//! # Design
//! The service only needs five single-record operations plus a filtered scan,
//! so that is all `TodoStore` exposes. Each call is expected to be atomic on
//! its own; concurrent updates to the same record are last-write-wins.
//!
//! `MemoryStore` keeps records in a `BTreeMap` keyed by id so scans come back
//! in ascending id order, the same natural order the SQL store uses.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::query::Filter;
use crate::types::{CreateTodo, Todo};

/// Persistence backend for todo records.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a new record, assigning its id. Both timestamps are set to `now`.
    async fn insert(&self, input: CreateTodo, now: NaiveDateTime) -> Result<Todo, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Todo>, StoreError>;

    /// All records matching `filter`, in ascending id order.
    async fn query(&self, filter: &Filter) -> Result<Vec<Todo>, StoreError>;

    /// Replace a stored record. Returns `None` if no record has that id.
    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, StoreError>;

    /// Delete a record, reporting whether it existed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Todo>,
    last_id: i64,
}

/// Volatile store backed by a map behind an async `RwLock`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Arc<RwLock<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, input: CreateTodo, now: NaiveDateTime) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        // ids are never reused, even after deletes
        table.last_id += 1;
        let todo = input.into_todo(table.last_id, now);
        table.rows.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn get(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn query(&self, filter: &Filter) -> Result<Vec<Todo>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect())
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&todo.id).map(|row| {
            *row = todo.clone();
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn input(title: &str, completed: bool) -> CreateTodo {
        CreateTodo {
            title: title.to_string(),
            description: String::new(),
            completed,
            deadline_at: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let a = store.insert(input("a", false), now()).await.unwrap();
        let b = store.insert(input("b", false), now()).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, now());
        assert_eq!(a.updated_at, now());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let a = store.insert(input("a", false), now()).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.insert(input("b", false), now()).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_filters_in_id_order() {
        let store = MemoryStore::new();
        for (title, done) in [("a", true), ("b", false), ("c", true)] {
            store.insert(input(title, done), now()).await.unwrap();
        }
        let params = vec![("completed".to_string(), "true".to_string())];
        let filter = Filter::from_query(&params, now()).unwrap();
        let titles: Vec<String> = store
            .query(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|todo| todo.title)
            .collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn update_replaces_existing_record() {
        let store = MemoryStore::new();
        let mut todo = store.insert(input("a", false), now()).await.unwrap();
        todo.title = "renamed".to_string();
        let updated = store.update(&todo).await.unwrap().unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(store.get(todo.id).await.unwrap().unwrap().title, "renamed");
    }

    #[tokio::test]
    async fn update_missing_record_is_none() {
        let store = MemoryStore::new();
        let todo = input("ghost", false).into_todo(9, now());
        assert!(store.update(&todo).await.unwrap().is_none());
        assert!(store.get(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let todo = store.insert(input("a", false), now()).await.unwrap();
        assert!(store.delete(todo.id).await.unwrap());
        assert!(!store.delete(todo.id).await.unwrap());
    }
}
